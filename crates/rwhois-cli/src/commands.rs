//! Verb table and dispatch.
//!
//! Record verbs take strictly positional arguments; clap rejects any other
//! count before the store is touched. Handles and kinds are then resolved
//! into an [`Action`], and only a valid action opens the data directory.

use anyhow::{Context as _, bail};
use clap::Subcommand;
use rwhois_core::{
  Directory,
  record::{
    Collection, Contact, Handle, NetworkResource, NewRecord, Organization, RecordKey, RecordKind,
  },
};
use rwhois_store_fs::{ExternalIndexer, FsStore};

use crate::{service::ServiceController, settings::Settings};

#[derive(Subcommand, Debug)]
pub enum Command {
  #[command(flatten)]
  Record(RecordCommand),
  #[command(flatten)]
  Service(ServiceCommand),
}

#[derive(Subcommand, Debug)]
pub enum RecordCommand {
  /// Add an organization, replacing any existing record with the same handle.
  AddOrg {
    handle:       String,
    org_name:     String,
    street:       String,
    city:         String,
    state:        String,
    postal_code:  String,
    country_code: String,
    phone:        String,
    email:        String,
  },
  /// Replace one field line of an organization.
  UpdateOrg { handle: String, field: String, value: String },
  DeleteOrg { handle: String },

  /// Add a contact, replacing any existing record with the same handle.
  AddContact {
    handle:       String,
    first_name:   String,
    last_name:    String,
    organization: String,
    street:       String,
    city:         String,
    state:        String,
    postal_code:  String,
    country_code: String,
    phone:        String,
    email:        String,
  },
  /// Replace one field line of a contact.
  UpdateContact { handle: String, field: String, value: String },
  DeleteContact { handle: String },

  /// Add a network resource under `network/<subtype>` (ipv4, ipv6 or asn);
  /// any other subtype stores it directly under `network`.
  AddNetwork {
    handle:        String,
    network:       String,
    net_name:      String,
    org:           String,
    tech_contact:  String,
    admin_contact: String,
    subtype:       String,
  },
  /// Replace one field line of a network resource and refresh its `updated`
  /// date.
  UpdateNetwork { handle: String, field: String, value: String, subtype: String },
  DeleteNetwork { handle: String, subtype: String },

  /// Run the indexer over every collection directory.
  RebuildIndexes,

  /// Print a stored record.
  Show { kind: String, handle: String, subtype: Option<String> },
  /// Print the handles stored in one collection.
  List { kind: String, subtype: Option<String> },
}

#[derive(Subcommand, Debug)]
pub enum ServiceCommand {
  /// Start the whois server.
  Start,
  /// Stop the whois server.
  Stop,
  /// Restart the whois server.
  Restart,
  /// Report whether the whois server is running.
  Status,
}

type FsDirectory = Directory<FsStore, ExternalIndexer>;

/// A validated record verb.
#[derive(Debug)]
enum Action {
  Add(NewRecord),
  Update { key: RecordKey, field: String, value: String },
  Delete(RecordKey),
  Rebuild,
  Show(RecordKey),
  List(Collection),
}

impl Action {
  /// Only these may create the data directory layout.
  fn lays_out(&self) -> bool { matches!(self, Self::Add(_) | Self::Rebuild) }
}

fn key(kind: RecordKind, handle: String, subtype: Option<&str>) -> anyhow::Result<RecordKey> {
  Ok(RecordKey::new(Collection::for_kind(kind, subtype), Handle::new(handle)?))
}

impl TryFrom<RecordCommand> for Action {
  type Error = anyhow::Error;

  fn try_from(command: RecordCommand) -> anyhow::Result<Self> {
    let action = match command {
      RecordCommand::AddOrg {
        handle,
        org_name,
        street,
        city,
        state,
        postal_code,
        country_code,
        phone,
        email,
      } => Self::Add(NewRecord::Organization(Organization {
        handle: Handle::new(handle)?,
        org_name,
        street,
        city,
        state,
        postal_code,
        country_code,
        phone,
        email,
      })),
      RecordCommand::AddContact {
        handle,
        first_name,
        last_name,
        organization,
        street,
        city,
        state,
        postal_code,
        country_code,
        phone,
        email,
      } => Self::Add(NewRecord::Contact(Contact {
        handle: Handle::new(handle)?,
        first_name,
        last_name,
        organization,
        street,
        city,
        state,
        postal_code,
        country_code,
        phone,
        email,
      })),
      RecordCommand::AddNetwork {
        handle,
        network,
        net_name,
        org,
        tech_contact,
        admin_contact,
        subtype,
      } => Self::Add(NewRecord::Network(NetworkResource {
        handle: Handle::new(handle)?,
        network,
        net_name,
        org,
        tech_contact,
        admin_contact,
        subtype,
      })),

      RecordCommand::UpdateOrg { handle, field, value } => Self::Update {
        key: key(RecordKind::Organization, handle, None)?,
        field,
        value,
      },
      RecordCommand::UpdateContact { handle, field, value } => Self::Update {
        key: key(RecordKind::Contact, handle, None)?,
        field,
        value,
      },
      RecordCommand::UpdateNetwork { handle, field, value, subtype } => Self::Update {
        key: key(RecordKind::Network, handle, Some(&subtype))?,
        field,
        value,
      },

      RecordCommand::DeleteOrg { handle } => {
        Self::Delete(key(RecordKind::Organization, handle, None)?)
      }
      RecordCommand::DeleteContact { handle } => {
        Self::Delete(key(RecordKind::Contact, handle, None)?)
      }
      RecordCommand::DeleteNetwork { handle, subtype } => {
        Self::Delete(key(RecordKind::Network, handle, Some(&subtype))?)
      }

      RecordCommand::RebuildIndexes => Self::Rebuild,

      RecordCommand::Show { kind, handle, subtype } => {
        Self::Show(key(RecordKind::parse(&kind)?, handle, subtype.as_deref())?)
      }
      RecordCommand::List { kind, subtype } => {
        Self::List(Collection::for_kind(RecordKind::parse(&kind)?, subtype.as_deref()))
      }
    };
    Ok(action)
  }
}

async fn open(settings: &Settings, lay_out: bool) -> anyhow::Result<FsDirectory> {
  let root = &settings.data_dir;
  let store = if lay_out {
    FsStore::init(root)
      .await
      .with_context(|| format!("failed to lay out data directory {}", root.display()))?
  } else {
    FsStore::open(root)
  };
  let indexer = ExternalIndexer::new(root, settings.indexer.clone());
  Ok(Directory::new(store, indexer))
}

pub async fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
  match command {
    Command::Record(command) => {
      let action = Action::try_from(command)?;
      let directory = open(settings, action.lays_out()).await?;
      run_action(action, &directory).await
    }
    Command::Service(command) => {
      run_service(command, &ServiceController::detect(&settings.server)).await
    }
  }
}

async fn run_service(command: ServiceCommand, controller: &ServiceController) -> anyhow::Result<()> {
  tracing::debug!(?controller, "service controller");
  match command {
    ServiceCommand::Start => controller.start().await,
    ServiceCommand::Stop => controller.stop().await,
    ServiceCommand::Restart => controller.restart().await,
    ServiceCommand::Status => {
      println!("{}", controller.status().await?);
      Ok(())
    }
  }
}

async fn run_action(action: Action, directory: &FsDirectory) -> anyhow::Result<()> {
  match action {
    Action::Add(record) => {
      let (key, _report) = directory.add(record).await?;
      println!("added {key}");
    }
    Action::Update { key, field, value } => {
      let (outcome, _report) = directory.update(&key, &field, &value).await?;
      if outcome.applied {
        println!("updated {key}: {field}");
      } else {
        eprintln!("notice: {key} has no {field:?} field; nothing replaced");
      }
    }
    Action::Delete(key) => {
      directory.delete(&key).await?;
      println!("deleted {key}");
    }
    Action::Rebuild => {
      let report = directory.rebuild_indexes().await;
      for dir in &report.directories {
        println!("{}: {}", dir.collection, dir.outcome);
      }
    }
    Action::Show(key) => {
      let Some(record) = directory.get(&key).await? else {
        bail!("record not found: {key}");
      };
      for field in &record.fields {
        println!("{}: {}", field.name, field.value);
      }
    }
    Action::List(collection) => {
      for handle in directory.list(collection).await? {
        println!("{handle}");
      }
    }
  }
  Ok(())
}
