//! Reading `.def` files into raw lines plus parsed parameter vectors.

use std::path::Path;

use tr_core::Real;

use crate::{DefError, DefResult, vocab};

/// One numeric parameter line pulled out of the file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedParameter {
    pub name: String,
    pub values: Vec<Real>,
    /// Fractional-digit count observed in the source text, used to
    /// re-serialize at the same precision.
    pub precision: usize,
}

/// A parsed `.def` file: every source line verbatim, plus the extracted
/// model header values and parameter vectors.
#[derive(Debug, Clone)]
pub struct DefFile {
    pub lines: Vec<String>,
    /// `NUR`: authoritative ring count.
    pub ring_count: usize,
    /// `INSET`: name of the data cube the model fits against.
    pub inset: String,
    /// `LOOPS`: fit iteration count, drives run progress reporting.
    pub loops: usize,
    pub parameters: Vec<ParsedParameter>,
}

impl DefFile {
    pub fn load(path: &Path) -> DefResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DefError::InvalidFile {
            what: format!("{}: {e}", path.display()),
        })?;
        let parsed = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            rings = parsed.ring_count,
            parameters = parsed.parameters.len(),
            "parsed def file"
        );
        Ok(parsed)
    }

    pub fn parse(content: &str) -> DefResult<Self> {
        let lines: Vec<String> = content.lines().map(str::to_string).collect();

        // NUR first: the ring count decides which other lines count as
        // parameter vectors.
        let ring_count = lines
            .iter()
            .filter_map(|line| key_value(line))
            .find(|(key, _)| key == "NUR")
            .and_then(|(_, rest)| first_token_usize(rest))
            .ok_or_else(|| DefError::InvalidFile {
                what: "no NUR (ring count) line".to_string(),
            })?;
        if ring_count == 0 {
            return Err(DefError::InvalidFile {
                what: "NUR is zero".to_string(),
            });
        }

        let mut inset = String::from("None");
        let mut loops = 0;
        let mut parameters: Vec<ParsedParameter> = Vec::new();

        for line in &lines {
            let Some((key, rest)) = key_value(line) else {
                continue;
            };
            match key.as_str() {
                "NUR" => {}
                "INSET" => inset = rest.trim().to_string(),
                "LOOPS" => loops = first_token_usize(rest).unwrap_or(0),
                _ => {
                    let tokens: Vec<&str> = rest.split_whitespace().collect();
                    if !all_numeric(&tokens) {
                        continue;
                    }
                    if tokens.len() != ring_count && vocab::standard_unit(&key).is_none() {
                        continue;
                    }
                    let values: Vec<Real> = tokens
                        .iter()
                        .filter_map(|t| t.parse::<Real>().ok())
                        .collect();
                    let precision = num_precision(&tokens);
                    let parsed = ParsedParameter {
                        name: key.clone(),
                        values,
                        precision,
                    };
                    // later duplicate lines win, matching a plain rescan
                    match parameters.iter_mut().find(|p| p.name == key) {
                        Some(existing) => *existing = parsed,
                        None => parameters.push(parsed),
                    }
                }
            }
        }

        Ok(Self {
            lines,
            ring_count,
            inset,
            loops,
            parameters,
        })
    }

    pub fn parameter(&self, name: &str) -> Option<&ParsedParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Split a `KEY= values` line, stripping all whitespace from the key and
/// uppercasing it. Lines without `=` are not key-value lines.
pub(crate) fn key_value(line: &str) -> Option<(String, &str)> {
    let (left, right) = line.split_once('=')?;
    let key: String = left.split_whitespace().collect::<String>().to_uppercase();
    if key.is_empty() {
        return None;
    }
    Some((key, right))
}

fn first_token_usize(rest: &str) -> Option<usize> {
    rest.split_whitespace()
        .next()
        .and_then(|t| t.parse::<f64>().ok())
        .map(|v| v as usize)
}

fn all_numeric(tokens: &[&str]) -> bool {
    !tokens.is_empty() && tokens.iter().all(|t| t.parse::<f64>().is_ok())
}

/// Highest fractional-digit count over scientific-notation tokens, e.g.
/// `["20.00E4", "55.0003E-4"]` has precision 4.
fn num_precision(tokens: &[&str]) -> usize {
    tokens
        .iter()
        .filter_map(|t| {
            let (_, frac) = t.split_once('.')?;
            let digits = frac.split(['E', 'e']).next().unwrap_or("");
            Some(digits.len())
        })
        .max()
        .unwrap_or(0)
}
