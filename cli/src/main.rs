#[macro_use]
extern crate clap;

use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use frame_common::UserAddress;
use frame_config::DATA_CIPHER_ROOT_DIR;
use module_data_cipher::DatabaseId;
use std::path::PathBuf;

mod commands;
mod error;
mod store;

const DEFAULT_KEYFILE_INDEX: &str = "0";

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let default_root_dir = DATA_CIPHER_ROOT_DIR.to_string_lossy().to_string();
    let matches = App::new("data-cipher")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .version(crate_version!())
        .author(crate_authors!())
        .about("Encrypted databases gated by an encrypted key")
        .arg(
            Arg::with_name("root-dir")
                .long("root-dir")
                .takes_value(true)
                .global(true)
                .default_value(&default_root_dir)
                .help("Directory holding the service state and account keys"),
        )
        .arg(
            Arg::with_name("keyfile-index")
                .short("i")
                .long("keyfile-index")
                .takes_value(true)
                .global(true)
                .default_value(DEFAULT_KEYFILE_INDEX)
                .help("Index of the account key to act as"),
        )
        .subcommand(SubCommand::with_name("address").about("Prints the DataCipher address"))
        .subcommand(
            SubCommand::with_name("create")
                .about("Creates a new encrypted database")
                .arg(name_arg()),
        )
        .subcommand(
            SubCommand::with_name("info")
                .about("Prints database metadata")
                .arg(id_arg()),
        )
        .subcommand(SubCommand::with_name("ids").about("Lists the databases created by the account"))
        .subcommand(
            SubCommand::with_name("decrypt-key")
                .about("Decrypts the encrypted database key")
                .arg(id_arg()),
        )
        .subcommand(
            SubCommand::with_name("add-entry")
                .about("Encrypts and stores a number in the database")
                .arg(id_arg())
                .arg(
                    Arg::with_name("key")
                        .long("key")
                        .short("k")
                        .takes_value(true)
                        .required(true)
                        .help("Decrypted database key, hex or base64"),
                )
                .arg(
                    Arg::with_name("value")
                        .long("value")
                        .short("v")
                        .takes_value(true)
                        .required(true)
                        .help("Value to encrypt"),
                ),
        )
        .subcommand(
            SubCommand::with_name("entries")
                .about("Decrypts all entries in a database")
                .arg(id_arg()),
        )
        .get_matches();

    let (command, matches) = match matches.subcommand() {
        (command, Some(sub_matches)) => (command, sub_matches),
        _ => return Err(anyhow!("{}", matches.usage())),
    };
    // global arguments are propagated to the subcommand's matches
    let root_dir = PathBuf::from(required(matches, "root-dir")?);
    let index: usize = required(matches, "keyfile-index")?.parse()?;

    match command {
        "address" => {
            let (service, account) = commands::address(&root_dir, index)?;
            println!("DataCipher address is {}", service);
            println!("Account {} is {}", index, account);
        }
        "create" => {
            let name = required(matches, "name")?;
            let (id, key) = commands::create(&root_dir, index, name)?;
            println!("Database created: id={} key={}", id, key);
        }
        "info" => {
            let id = parse_id(matches)?;
            let info = commands::info(&root_dir, id)?;
            println!(
                "Database {}: name={} owner={} entries={}",
                id, info.name, info.owner, info.entry_count
            );
        }
        "ids" => {
            let ids = commands::ids(&root_dir, index)?;
            let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
            println!("Databases of account {}: [{}]", index, ids.join(", "));
        }
        "decrypt-key" => {
            let id = parse_id(matches)?;
            let key = commands::decrypt_key(&root_dir, index, id)?;
            println!("Database {} key: {}", id, key);
        }
        "add-entry" => {
            let id = parse_id(matches)?;
            let key: UserAddress = required(matches, "key")?
                .parse()
                .map_err(|e| anyhow!("Argument --key is not a valid address: {}", e))?;
            let value: u32 = required(matches, "value")?
                .parse()
                .map_err(|e| anyhow!("Argument --value is not a 32-bit unsigned integer: {}", e))?;
            commands::add_entry(&root_dir, index, id, key, value)?;
            println!("Stored value {} in database {}", value, id);
        }
        "entries" => {
            let id = parse_id(matches)?;
            let values = commands::entries(&root_dir, index, id)?;
            if values.is_empty() {
                println!("Database {} has no entries", id);
            } else {
                println!("Database {} entries:", id);
                for (i, value) in values.iter().enumerate() {
                    println!("  [{}] {}", i, value);
                }
            }
        }
        _ => return Err(anyhow!("{}", matches.usage())),
    }

    Ok(())
}

fn name_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("name")
        .long("name")
        .short("n")
        .takes_value(true)
        .required(true)
        .help("Database name, at most 48 characters")
}

fn id_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("id")
        .long("id")
        .takes_value(true)
        .required(true)
        .help("Database id")
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .value_of(name)
        .ok_or_else(|| anyhow!("Not found {}", name))
}

fn parse_id(matches: &ArgMatches) -> Result<DatabaseId> {
    required(matches, "id")?
        .parse()
        .map_err(|e| anyhow!("Argument --id is not a database id: {}", e))
}
