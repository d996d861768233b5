//! Human-readable table output.
//!
//! Renders each group as a small aligned table with a label column, file
//! name, location and human-readable size. Colors come from `yansi` and are
//! switched off globally by `--no-color` or `NO_COLOR`.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::duplicates::DuplicateGroup;
use crate::scanner::FileRecord;

/// First column of a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLabel {
    /// `[n]`, 1-based position in the group
    Index(usize),
    /// The file that will be kept
    Keep,
    /// A file that will be deleted
    Delete,
    /// Which compared directory the file came from
    Side(crate::duplicates::Side),
}

impl RowLabel {
    fn text(&self) -> String {
        match self {
            Self::Index(n) => format!("[{n}]"),
            Self::Keep => "[KEEP]".to_string(),
            Self::Delete => "[DEL]".to_string(),
            Self::Side(side) => format!("[{side}]"),
        }
    }
}

/// Human-readable size (IEC units).
#[must_use]
pub fn format_size(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

/// Write the report headline.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_summary<W: Write>(
    w: &mut W,
    group_count: usize,
    wasted: u64,
    across_directories: bool,
) -> io::Result<()> {
    if across_directories {
        writeln!(
            w,
            "\nFound {} duplicate groups across directories ({} duplicated)\n",
            group_count.bold(),
            format_size(wasted).yellow()
        )
    } else {
        writeln!(
            w,
            "\nFound {} duplicate groups ({} wasted)\n",
            group_count.bold(),
            format_size(wasted).yellow()
        )
    }
}

/// Title line of a group: size, member count and similarity for images.
#[must_use]
pub fn group_title(index: usize, group: &DuplicateGroup) -> String {
    let similarity = if group.is_image {
        format!(" ~{}% similar", group.similarity_percent)
    } else {
        String::new()
    };
    format!(
        "Group {} ({}, {} files{})",
        index + 1,
        format_size(group.representative_size),
        group.len(),
        similarity
    )
}

/// Write a group title followed by its rows.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_group<W: Write>(
    w: &mut W,
    index: usize,
    group: &DuplicateGroup,
    rows: &[(RowLabel, &FileRecord)],
) -> io::Result<()> {
    writeln!(w, "\n{}:", group_title(index, group).bold())?;
    write_rows(w, rows)
}

/// Rows labelled `[1]..[n]` in group order.
#[must_use]
pub fn indexed_rows(group: &DuplicateGroup) -> Vec<(RowLabel, &FileRecord)> {
    group
        .files
        .iter()
        .enumerate()
        .map(|(i, f)| (RowLabel::Index(i + 1), f))
        .collect()
}

/// Rows marking the first file as kept and the rest as deleted.
#[must_use]
pub fn keep_first_rows(group: &DuplicateGroup) -> Vec<(RowLabel, &FileRecord)> {
    group
        .files
        .iter()
        .enumerate()
        .map(|(i, f)| (if i == 0 { RowLabel::Keep } else { RowLabel::Delete }, f))
        .collect()
}

/// Write an aligned table of files.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_rows<W: Write>(w: &mut W, rows: &[(RowLabel, &FileRecord)]) -> io::Result<()> {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|(label, file)| {
            [
                label.text(),
                file.file_name(),
                file.location(),
                format_size(file.size),
            ]
        })
        .collect();

    let headers = ["#", "Filename", "Location", "Size"];
    let mut widths = headers.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header_line = format!(
        "  {:<w0$}  {:<w1$}  {:<w2$}  {:>w3$}",
        headers[0],
        headers[1],
        headers[2],
        headers[3],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
        w3 = widths[3]
    );
    writeln!(w, "{}", header_line.dim())?;

    for ((label, _), row) in rows.iter().zip(&cells) {
        let label_cell = format!("{:<w$}", row[0], w = widths[0]);
        let painted = match label {
            RowLabel::Keep => label_cell.green().bold(),
            RowLabel::Delete => label_cell.red().bold(),
            RowLabel::Index(_) | RowLabel::Side(_) => label_cell.cyan(),
        };
        writeln!(
            w,
            "  {}  {:<w1$}  {:<w2$}  {:>w3$}",
            painted,
            row[1],
            row[2],
            row[3],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3]
        )?;
    }

    Ok(())
}
