//! Bulk-load the ingredient and tag catalogs.
//!
//! Usage:
//!   cargo run -p potluck-server --bin import_ingredients -- ingredients data/ingredients.json
//!   cargo run -p potluck-server --bin import_ingredients -- tags data/tags.json

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use diesel::prelude::*;
use potluck_server::models::{NewIngredient, NewTag};
use potluck_server::schema::{ingredients, tags};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "import_ingredients")]
#[command(about = "Load ingredient and tag catalogs into the database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import ingredients from a JSON file of {name, measurement_unit} records
    Ingredients {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Import tags from a JSON file of {name, colour, slug} records
    Tags {
        /// Path to the JSON file
        file: PathBuf,
    },
}

#[derive(Deserialize)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

#[derive(Deserialize)]
struct TagRecord {
    name: String,
    colour: String,
    slug: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let mut conn =
        PgConnection::establish(&database_url).context("Failed to connect to database")?;

    match cli.command {
        Commands::Ingredients { file } => {
            let data = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let records: Vec<IngredientRecord> =
                serde_json::from_str(&data).context("Invalid ingredient JSON")?;

            let rows: Vec<NewIngredient> = records
                .iter()
                .map(|r| NewIngredient {
                    name: &r.name,
                    measurement_unit: &r.measurement_unit,
                })
                .collect();

            let inserted = diesel::insert_into(ingredients::table)
                .values(&rows)
                .execute(&mut conn)
                .context("Failed to insert ingredients")?;

            println!("Imported {} ingredients", inserted);
        }
        Commands::Tags { file } => {
            let data = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let records: Vec<TagRecord> =
                serde_json::from_str(&data).context("Invalid tag JSON")?;

            let rows: Vec<NewTag> = records
                .iter()
                .map(|r| NewTag {
                    name: &r.name,
                    colour: &r.colour,
                    slug: &r.slug,
                })
                .collect();

            // Reruns skip tags that already exist
            let inserted = diesel::insert_into(tags::table)
                .values(&rows)
                .on_conflict_do_nothing()
                .execute(&mut conn)
                .context("Failed to insert tags")?;

            println!("Imported {} tags", inserted);
        }
    }

    Ok(())
}
