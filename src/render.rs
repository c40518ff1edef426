//! Result rendering for the CLI.
//!
//! Human output prints one card per record with the fields a directory
//! listing shows (name, handle, email, phone, website, company). JSON
//! output is an array of the full records plus an `avatar_url`.

use anyhow::Result;
use directory_search_core::models::{Record, RecordId};
use serde::Serialize;

pub const NO_RESULTS: &str = "No users found matching your search. Try a different term.";

/// Placeholder avatar for a record id.
pub fn avatar_url(id: RecordId) -> String {
    format!("https://i.pravatar.cc/100?img={}", id)
}

pub fn format_card(record: &Record) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}  @{}  (id {})\n", record.name, record.username, record.id));
    out.push_str(&format!("    email:    {}\n", record.email));
    if !record.phone.is_empty() {
        out.push_str(&format!("    phone:    {}\n", record.phone));
    }
    if !record.website.is_empty() {
        out.push_str(&format!("    website:  {}\n", record.website));
    }
    out.push_str(&format!("    company:  {}\n", record.company.name));
    out
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    #[serde(flatten)]
    record: &'a Record,
    avatar_url: String,
}

pub fn to_json(records: &[Record]) -> Result<String> {
    let rows: Vec<JsonRecord<'_>> = records
        .iter()
        .map(|record| JsonRecord {
            record,
            avatar_url: avatar_url(record.id),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

pub fn format_results(records: &[Record]) -> String {
    if records.is_empty() {
        return format!("{}\n", NO_RESULTS);
    }
    let mut out = String::new();
    for record in records {
        out.push_str(&format_card(record));
    }
    out.push_str(&format!("{} result(s)\n", records.len()));
    out
}

pub fn print_results(records: &[Record], json: bool) -> Result<()> {
    if json {
        println!("{}", to_json(records)?);
    } else {
        print!("{}", format_results(records));
    }
    Ok(())
}
