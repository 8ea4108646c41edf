//! `prbridge_tools` — operational data tasks against the same `Store`/`DocStore` traits the
//! server uses.

#![cfg_attr(not(test), forbid(missing_debug_implementations, unreachable_pub, unsafe_code))]
#![cfg_attr(not(test), deny(missing_copy_implementations))]

use clap::{Parser, Subcommand};

use prbridge::store::mem::MemDocStore;
use prbridge::store::DocStore;

#[derive(Parser, Debug)]
#[command(name = "prbridge_tools")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Dump matching `TrackedMessage` rows as pretty JSON to stdout.
  DumpTrackedMessages {
    #[arg(long)]
    workspace: String,
    #[arg(long)]
    repo: Option<String>,
  },
  /// One-shot field-backfill migration over a collection.
  MigrateAddField {
    #[arg(long)]
    collection: String,
    #[arg(long)]
    field: String,
    #[arg(long, value_parser = parse_json_value)]
    default: serde_json::Value,
    #[arg(long)]
    dry_run: bool,
  },
}

fn parse_json_value(s: &str) -> Result<serde_json::Value, String> {
  serde_json::from_str(s).map_err(|e| e.to_string())
}

fn main() {
  prbridge::config::bootstrap();

  let cli = Cli::parse();

  // A real deployment would open the configured production `DocStore`; the toolbox is wired
  // against the same in-process fake the server falls back to, so `dump-tracked-messages` and
  // `migrate-add-field` are only useful here against a local JSON snapshot loaded some other way.
  let store = MemDocStore::new();

  match cli.command {
    | Command::DumpTrackedMessages { workspace, repo } => dump_tracked_messages(&store, &workspace, repo.as_deref()),
    | Command::MigrateAddField { collection, field, default, dry_run } => {
      migrate_add_field(&store, &collection, &field, default, dry_run)
    },
  }
}

fn dump_tracked_messages(store: &MemDocStore, workspace: &str, repo: Option<&str>) {
  let all = store.all("trackedmessages").unwrap_or_else(|e| {
                  eprintln!("store error: {:#?}", e);
                  std::process::exit(1);
                });

  let matching: Vec<&serde_json::Value> =
    all.iter()
       .filter(|doc| doc.get("workspace_id").and_then(|v| v.as_str()) == Some(workspace))
       .filter(|doc| {
         repo.map(|r| doc.get("repo_full_name").and_then(|v| v.as_str()) == Some(r)).unwrap_or(true)
       })
       .collect();

  println!("{}", serde_json::to_string_pretty(&matching).expect("json always serializes"));
}

fn migrate_add_field(store: &MemDocStore, collection: &str, field: &str, default: serde_json::Value, dry_run: bool) {
  let docs = store.all(collection).unwrap_or_else(|e| {
                     eprintln!("store error: {:#?}", e);
                     std::process::exit(1);
                   });

  let mut touched = 0u64;

  for mut doc in docs {
    let id = match doc.get("id").or_else(|| doc.get("github_login")).and_then(|v| v.as_str()) {
      | Some(id) => id.to_string(),
      | None => continue,
    };

    let obj = match doc.as_object_mut() {
      | Some(obj) => obj,
      | None => continue,
    };

    if obj.contains_key(field) {
      continue;
    }

    touched += 1;

    if !dry_run {
      obj.insert(field.to_string(), default.clone());
      if let Err(e) = store.put(collection, &id, doc) {
        eprintln!("failed to write {}/{}: {:#?}", collection, id, e);
      }
    }
  }

  if dry_run {
    println!("would touch {} document(s) in {}", touched, collection);
  } else {
    println!("touched {} document(s) in {}", touched, collection);
  }
}
