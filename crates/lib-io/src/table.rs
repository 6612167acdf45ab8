//! Numeric column tables.
//!
//! Plain text tables carry the data the transforms consume and produce that
//! has no standard file format: the dispersion relation of a medium
//! (frequency, beta) and distance-domain responses (distance, re, im).
//!
//! Accepted layout:
//! - fields separated by commas, semicolons, tabs or spaces
//! - `#` and `!` start comments, full-line or trailing
//! - one optional header line before the first data row

use crate::error::ParseError;
use lib_types::response::{DistanceProfile, FrequencySweep};
use lib_types::Complex64;
use nom::{
    branch::alt,
    character::complete::{one_of, space0, space1},
    combinator::{all_consuming, value},
    multi::separated_list1,
    number::complete::double,
    sequence::delimited,
    IResult, Parser,
};
use std::io::Write;
use std::path::Path;

/// A parsed table, stored column by column.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    /// Header names, if the file had a header line.
    pub header: Option<Vec<String>>,

    /// One vector per column, all of the same length.
    pub columns: Vec<Vec<f64>>,
}

impl Table {
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    fn require_columns(&self, needed: usize, what: &str) -> Result<(), ParseError> {
        if self.num_columns() < needed {
            return Err(ParseError::invalid_format(
                what,
                format!("need {} columns, found {}", needed, self.num_columns()),
            ));
        }
        if self.num_rows() == 0 {
            return Err(ParseError::invalid_format(what, "no data rows"));
        }
        Ok(())
    }
}

/// Phase constant of a medium sampled over frequency.
#[derive(Clone, Debug, PartialEq)]
pub struct DispersionTable {
    /// Hz.
    pub frequencies: Vec<f64>,
    /// rad/m.
    pub beta: Vec<f64>,
}

/// Field separator: `,` or `;` with optional padding, or plain whitespace.
fn separator(input: &str) -> IResult<&str, ()> {
    alt((
        value((), delimited(space0, one_of(",;"), space0)),
        value((), space1),
    ))
    .parse(input)
}

/// A full line of numeric fields.
pub(crate) fn numeric_fields(input: &str) -> IResult<&str, Vec<f64>> {
    all_consuming(delimited(
        space0,
        separated_list1(separator, double),
        space0,
    ))
    .parse(input)
}

/// Strip a trailing `#` or `!` comment.
pub(crate) fn strip_comment(line: &str) -> &str {
    match line.find(['#', '!']) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn header_fields(line: &str) -> Vec<String> {
    line.split([',', ';', '\t', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a table from text.
pub fn parse_table(content: &str) -> Result<Table, ParseError> {
    let mut header = None;
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw);
        if line.trim().is_empty() {
            continue;
        }

        match numeric_fields(line) {
            Ok((_, values)) => {
                if let Some(first) = rows.first() {
                    if values.len() != first.len() {
                        return Err(ParseError::syntax(
                            line_no,
                            1,
                            format!("expected {} fields, found {}", first.len(), values.len()),
                        ));
                    }
                }
                rows.push(values);
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let is_header = rows.is_empty()
                    && header.is_none()
                    && line.chars().any(|c| c.is_ascii_alphabetic());
                if !is_header {
                    let column = line.len() - e.input.len() + 1;
                    return Err(ParseError::syntax(line_no, column, "expected a number"));
                }
                header = Some(header_fields(line));
            }
            Err(e @ nom::Err::Incomplete(_)) => return Err(e.into()),
        }
    }

    if let (Some(names), Some(first)) = (&header, rows.first()) {
        if names.len() != first.len() {
            tracing::warn!(
                "Header has {} names but rows have {} fields",
                names.len(),
                first.len()
            );
        }
    }

    let width = rows.first().map_or(0, Vec::len);
    let mut columns = vec![Vec::with_capacity(rows.len()); width];
    for row in rows {
        for (column, value) in columns.iter_mut().zip(row) {
            column.push(value);
        }
    }

    Ok(Table { header, columns })
}

/// Parse a dispersion relation: columns `frequency_hz, beta_rad_per_m`.
pub fn parse_dispersion(content: &str) -> Result<DispersionTable, ParseError> {
    let mut table = parse_table(content)?;
    table.require_columns(2, "dispersion table")?;
    if table.num_columns() > 2 {
        tracing::warn!(
            "Dispersion table has {} columns, using the first two",
            table.num_columns()
        );
    }

    let beta = table.columns.swap_remove(1);
    let frequencies = table.columns.swap_remove(0);

    if let Some(i) = frequencies.windows(2).position(|w| w[1] <= w[0]) {
        return Err(ParseError::invalid_value(
            "frequency",
            format!("not strictly increasing at row {}", i + 2),
        ));
    }

    Ok(DispersionTable { frequencies, beta })
}

/// Parse a distance-domain response: columns `distance_m, re, im`.
///
/// Further columns (such as a magnitude written alongside) are ignored.
pub fn parse_distance_profile(content: &str) -> Result<DistanceProfile, ParseError> {
    let table = parse_table(content)?;
    table.require_columns(3, "distance response")?;

    let response = table.columns[1]
        .iter()
        .zip(table.columns[2].iter())
        .map(|(&re, &im)| Complex64::new(re, im))
        .collect();

    Ok(DistanceProfile::new(table.columns[0].clone(), response)?)
}

/// Read a dispersion relation table from a file.
pub fn read_dispersion(path: &Path) -> Result<DispersionTable, ParseError> {
    parse_dispersion(&std::fs::read_to_string(path)?)
}

/// Read a distance-domain response table from a file.
pub fn read_distance_profile(path: &Path) -> Result<DistanceProfile, ParseError> {
    parse_distance_profile(&std::fs::read_to_string(path)?)
}

/// Write a distance profile as `distance_m,re,im,magnitude`.
pub fn write_distance_profile<W: Write>(
    writer: &mut W,
    profile: &DistanceProfile,
) -> std::io::Result<()> {
    writeln!(writer, "distance_m,re,im,magnitude")?;
    for (x, r) in profile.distances.iter().zip(profile.response.iter()) {
        writeln!(writer, "{},{},{},{}", x, r.re, r.im, r.norm())?;
    }
    Ok(())
}

/// Write a frequency sweep as `frequency_hz,beta_rad_per_m,re,im,magnitude_db,phase_deg`.
pub fn write_frequency_sweep<W: Write>(
    writer: &mut W,
    sweep: &FrequencySweep,
) -> std::io::Result<()> {
    writeln!(writer, "frequency_hz,beta_rad_per_m,re,im,magnitude_db,phase_deg")?;
    for ((f, b), r) in sweep
        .frequencies
        .iter()
        .zip(sweep.beta.iter())
        .zip(sweep.response.iter())
    {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            f,
            b,
            r.re,
            r.im,
            20.0 * r.norm().log10(),
            r.arg().to_degrees()
        )?;
    }
    Ok(())
}
