use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// One piece of a report section.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(String),
    /// Pre-rendered table text.
    Table(String),
    Chart {
        path: PathBuf,
        data_path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn text(mut self, s: impl Into<String>) -> Self {
        self.blocks.push(Block::Text(s.into()));
        self
    }

    pub fn table<T: Tabled>(mut self, rows: Vec<T>) -> Self {
        self.blocks.push(Block::Table(markdown_table(rows)));
        self
    }

    pub fn grid(mut self, header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        self.blocks.push(Block::Table(markdown_grid(header, rows)));
        self
    }

    pub fn chart(mut self, path: PathBuf, data_path: Option<PathBuf>) -> Self {
        self.blocks.push(Block::Chart { path, data_path });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub sections: Vec<Section>,
}

impl Report {
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}

pub fn markdown_table<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}

/// Table with columns only known at runtime (e.g. the correlation matrix).
pub fn markdown_grid(header: Vec<String>, rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn render<W: Write>(report: &Report, out: &mut W) -> io::Result<()> {
    writeln!(out, "# {}\n", report.title)?;
    for section in &report.sections {
        writeln!(out, "## {}\n", section.title)?;
        for block in &section.blocks {
            match block {
                Block::Text(s) | Block::Table(s) => writeln!(out, "{}\n", s)?,
                Block::Chart { path, data_path } => {
                    writeln!(out, "[chart] {}", path.display())?;
                    if let Some(data) = data_path {
                        writeln!(out, "[points] {}", data.display())?;
                    }
                    writeln!(out)?;
                }
            }
        }
    }
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)
}
