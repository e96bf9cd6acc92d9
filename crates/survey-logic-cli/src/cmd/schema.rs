use anyhow::Result;
use clap::{Args, ValueEnum};
use survey_logic::schema::{state_schema, survey_schema};

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Which document to describe
    #[arg(value_enum, default_value = "survey")]
    pub kind: SchemaKind,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Survey,
    State,
}

pub fn run(args: &SchemaArgs) -> Result<()> {
    let schema = match args.kind {
        SchemaKind::Survey => survey_schema(),
        SchemaKind::State => state_schema(),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
