//! Touchstone S-parameter file parser.
//!
//! Supports:
//! - Touchstone 1.x files (.s1p, .s2p, .s4p, ...)
//! - Data formats RI, MA, DB
//! - Frequency units Hz, kHz, MHz, GHz
//! - Data records split across several lines
//!
//! The 2-port format stores its four terms column-major
//! (`S11 S21 S12 S22`); every other port count is row-major.

use crate::error::ParseError;
use crate::table::{numeric_fields, strip_comment};
use lib_types::{
    sparams::{DataFormat, SParameters},
    units::{Hertz, Ohms},
};
use ndarray::Array2;
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    combinator::{all_consuming, value},
    IResult, Parser,
};
use std::path::Path;

/// Network parameter type named on the option line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterKind {
    S,
    Y,
    Z,
    H,
    G,
}

/// Settings from the `#` option line.
#[derive(Clone, Debug, PartialEq)]
pub struct OptionLine {
    /// Multiplier taking file frequencies to Hz.
    pub freq_mult: f64,
    pub kind: ParameterKind,
    pub format: DataFormat,
    pub z0: Ohms,
}

impl Default for OptionLine {
    /// Touchstone defaults: `# GHZ S MA R 50`.
    fn default() -> Self {
        Self {
            freq_mult: 1e9,
            kind: ParameterKind::S,
            format: DataFormat::MA,
            z0: Ohms::Z0_50,
        }
    }
}

/// Parsed Touchstone file.
#[derive(Clone, Debug)]
pub struct TouchstoneFile {
    pub options: OptionLine,
    pub num_ports: usize,
    pub sparams: SParameters,
}

/// Parse a Touchstone file from a string, inferring the port count from
/// the first data line (3 values: 1-port, 9 values: 2-port).
///
/// Only single-line records can be inferred. A 4-port record also opens
/// with 9 values but continues on further lines, so a file whose lines are
/// not all as wide as the first is rejected; read such files through
/// [`read_touchstone`] or [`parse_touchstone_ports`].
pub fn parse_touchstone(content: &str) -> Result<TouchstoneFile, ParseError> {
    let (options, lines) = scan(content)?;
    let num_ports = match lines.first().map(|(_, values)| values.len()) {
        Some(3) => 1,
        Some(9) => 2,
        Some(n) => {
            return Err(ParseError::invalid_format(
                "Touchstone",
                format!(
                    "cannot infer port count from {} values on the first data line; \
                     use read_touchstone with a .sNp file name",
                    n
                ),
            ))
        }
        None => return Err(ParseError::invalid_format("Touchstone", "no data lines")),
    };

    let width = 1 + 2 * num_ports * num_ports;
    if let Some((line_no, values)) = lines.iter().find(|(_, v)| v.len() != width) {
        return Err(ParseError::invalid_format(
            "Touchstone",
            format!(
                "line {} has {} values, expected {} for {}-port data; \
                 multi-line records need the port count from a .sNp file name",
                line_no,
                values.len(),
                width,
                num_ports
            ),
        ));
    }
    build(options, &lines, num_ports)
}

/// Parse a Touchstone file whose port count is known.
pub fn parse_touchstone_ports(
    content: &str,
    num_ports: usize,
) -> Result<TouchstoneFile, ParseError> {
    if num_ports == 0 {
        return Err(ParseError::invalid_value("ports", "must be at least 1"));
    }
    let (options, lines) = scan(content)?;
    build(options, &lines, num_ports)
}

/// Read a Touchstone file, taking the port count from its `.sNp` extension.
pub fn read_touchstone(path: &Path) -> Result<TouchstoneFile, ParseError> {
    let content = std::fs::read_to_string(path)?;
    match ports_from_extension(path) {
        Some(n) => parse_touchstone_ports(&content, n),
        None => {
            tracing::debug!(
                "{} has no .sNp extension, inferring port count",
                path.display()
            );
            parse_touchstone(&content)
        }
    }
}

fn ports_from_extension(path: &Path) -> Option<usize> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ext.strip_prefix('s')?.strip_suffix('p')?.parse().ok()
}

type DataLine = (usize, Vec<f64>);

/// Split the file into its option line and numbered data lines.
fn scan(content: &str) -> Result<(OptionLine, Vec<DataLine>), ParseError> {
    let mut options = None;
    let mut lines = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = match raw.find('!') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('#') {
            if options.is_some() {
                tracing::warn!("Line {}: repeated option line ignored", line_no);
                continue;
            }
            let offset = line.len() - rest.len();
            options = Some(parse_option_line(rest, line_no, offset)?);
            continue;
        }

        if options.is_none() {
            tracing::warn!("Line {}: data before option line, using defaults", line_no);
            options = Some(OptionLine::default());
        }

        match numeric_fields(strip_comment(line)) {
            Ok((_, values)) => lines.push((line_no, values)),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let column = line.len() - e.input.len() + 1;
                return Err(ParseError::syntax(line_no, column, "expected a number"));
            }
            Err(e @ nom::Err::Incomplete(_)) => return Err(e.into()),
        }
    }

    Ok((options.unwrap_or_default(), lines))
}

#[derive(Clone, Debug, PartialEq)]
enum OptionToken {
    FreqUnit(f64),
    Kind(ParameterKind),
    Format(DataFormat),
    Resistance,
}

fn option_token(input: &str) -> IResult<&str, OptionToken> {
    all_consuming(alt((
        value(OptionToken::FreqUnit(1.0), tag_no_case("HZ")),
        value(OptionToken::FreqUnit(1e3), tag_no_case("KHZ")),
        value(OptionToken::FreqUnit(1e6), tag_no_case("MHZ")),
        value(OptionToken::FreqUnit(1e9), tag_no_case("GHZ")),
        value(OptionToken::Format(DataFormat::RI), tag_no_case("RI")),
        value(OptionToken::Format(DataFormat::MA), tag_no_case("MA")),
        value(OptionToken::Format(DataFormat::DB), tag_no_case("DB")),
        value(OptionToken::Kind(ParameterKind::S), tag_no_case("S")),
        value(OptionToken::Kind(ParameterKind::Y), tag_no_case("Y")),
        value(OptionToken::Kind(ParameterKind::Z), tag_no_case("Z")),
        value(OptionToken::Kind(ParameterKind::H), tag_no_case("H")),
        value(OptionToken::Kind(ParameterKind::G), tag_no_case("G")),
        value(OptionToken::Resistance, tag_no_case("R")),
    )))
    .parse(input)
}

/// Parse the text after `#`. `offset` is the byte column of that text.
fn parse_option_line(
    rest: &str,
    line_no: usize,
    offset: usize,
) -> Result<OptionLine, ParseError> {
    let mut options = OptionLine::default();
    let column_of = |token: &str| offset + (token.as_ptr() as usize - rest.as_ptr() as usize) + 1;

    let mut tokens = rest.split_whitespace();
    while let Some(token) = tokens.next() {
        let (_, parsed) = option_token(token).map_err(|_| {
            ParseError::syntax(line_no, column_of(token), format!("unknown option '{}'", token))
        })?;

        match parsed {
            OptionToken::FreqUnit(mult) => options.freq_mult = mult,
            OptionToken::Kind(kind) => options.kind = kind,
            OptionToken::Format(format) => options.format = format,
            OptionToken::Resistance => {
                let z0 = tokens.next().ok_or_else(|| {
                    ParseError::syntax(line_no, column_of(token), "R without a value")
                })?;
                let ohms: f64 = z0.parse().map_err(|_| {
                    ParseError::syntax(
                        line_no,
                        column_of(z0),
                        format!("invalid resistance '{}'", z0),
                    )
                })?;
                if !ohms.is_finite() || ohms <= 0.0 {
                    return Err(ParseError::invalid_value(
                        "R",
                        format!("{} is not a positive resistance", ohms),
                    ));
                }
                options.z0 = Ohms(ohms);
            }
        }
    }

    Ok(options)
}

fn build(
    options: OptionLine,
    lines: &[DataLine],
    num_ports: usize,
) -> Result<TouchstoneFile, ParseError> {
    if options.kind != ParameterKind::S {
        tracing::warn!(
            "File holds {:?}-parameters, reading them as S-parameters",
            options.kind
        );
    }

    let values_per_freq = 1 + 2 * num_ports * num_ports;
    let values: Vec<f64> = lines.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    if values.len() < values_per_freq {
        return Err(ParseError::invalid_format(
            "Touchstone",
            format!(
                "need at least {} values for {}-port data, got {}",
                values_per_freq,
                num_ports,
                values.len()
            ),
        ));
    }

    let mut sparams = SParameters::new(num_ports, options.z0);
    let mut previous: Option<f64> = None;

    for (point, chunk) in values.chunks_exact(values_per_freq).enumerate() {
        let freq = chunk[0] * options.freq_mult;
        if let Some(prev) = previous {
            if freq <= prev {
                return Err(ParseError::invalid_value(
                    "frequency",
                    format!("point {} at {} Hz does not increase", point + 1, freq),
                ));
            }
        }
        previous = Some(freq);

        let mut matrix = Array2::zeros((num_ports, num_ports));
        for (k, pair) in chunk[1..].chunks_exact(2).enumerate() {
            let (row, col) = if num_ports == 2 {
                (k % 2, k / 2)
            } else {
                (k / num_ports, k % num_ports)
            };
            matrix[[row, col]] = options.format.to_complex(pair[0], pair[1]);
        }
        sparams.add_point(Hertz(freq), matrix)?;
    }

    let leftover = values.len() % values_per_freq;
    if leftover != 0 {
        tracing::warn!(
            "Incomplete frequency point at end of Touchstone data: {} values ignored",
            leftover
        );
    }

    tracing::debug!(
        "Touchstone: {} ports, {} points, {:?}",
        num_ports,
        sparams.len(),
        options.format
    );

    Ok(TouchstoneFile {
        options,
        num_ports,
        sparams,
    })
}
