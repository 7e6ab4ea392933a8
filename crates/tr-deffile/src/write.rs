//! Re-rendering parameter lines and writing `.def` files back out.
//!
//! Saves never stream to disk: the complete replacement line-set is built
//! in memory first, so a failure mid-build leaves the original file intact.

use std::path::Path;

use tr_core::Real;

use crate::DefResult;
use crate::parse::key_value;

/// Scientific notation in the source format: `2.00E+01`, sign and
/// two-digit exponent always present.
pub fn format_sci(value: Real, precision: usize) -> String {
    let formatted = format!("{value:.precision$e}");
    let (mantissa, exponent) = formatted
        .split_once('e')
        .expect("float formatting always emits an exponent");
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}E{sign}{digits:0>2}")
}

/// Render one tracked parameter as `    NAME= v0 v1 v2 ...`.
pub fn render_parameter_line(name: &str, values: &[Real], precision: usize) -> String {
    let mut line = format!("    {name}=");
    for v in values {
        line.push(' ');
        line.push_str(&format_sci(*v, precision));
    }
    line
}

/// Replace the parameter's line(s) in the line-set, or append a
/// unit-measurement comment plus a new line when the parameter was not
/// previously present. Untouched lines stay verbatim. Returns whether an
/// existing line was replaced.
pub fn splice_parameter(
    lines: &mut Vec<String>,
    name: &str,
    values: &[Real],
    precision: usize,
    unit: &str,
) -> bool {
    let rendered = render_parameter_line(name, values, precision);
    let mut replaced = false;
    for line in lines.iter_mut() {
        if let Some((key, _)) = key_value(line) {
            if key == name {
                *line = rendered.clone();
                replaced = true;
            }
        }
    }
    if !replaced {
        lines.push(format!("# {name} parameter in {unit}"));
        lines.push(rendered);
    }
    replaced
}

/// Rewrite fitting controls so the simulation binary runs unattended:
/// fit action on, prompting off, graphics output cleared, progress log on.
pub fn prepare_for_run(lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len() + 1);
    for line in lines {
        match key_value(line).map(|(key, _)| key) {
            Some(key) if key == "ACTION" => out.push("ACTION = 1".to_string()),
            Some(key) if key == "PROMPT" => out.push("PROMPT = 0".to_string()),
            Some(key) if key == "PROGRESSLOG" => out.push("PROGRESSLOG = progress".to_string()),
            Some(key) if key == "GR_DEVICE" => {
                out.push(line.clone());
                out.push("GR_CONT = ".to_string());
            }
            Some(key) if key == "GR_CONT" => {}
            _ => out.push(line.clone()),
        }
    }
    out
}

/// Write the full line-set, one newline-terminated line each.
pub fn save_lines(path: &Path, lines: &[String]) -> DefResult<()> {
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(path, content)?;
    tracing::debug!(path = %path.display(), lines = lines.len(), "wrote def file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scientific_format_matches_source_style() {
        assert_eq!(format_sci(20.0, 2), "2.00E+01");
        assert_eq!(format_sci(0.0, 2), "0.00E+00");
        assert_eq!(format_sci(-0.0015, 1), "-1.5E-03");
        assert_eq!(format_sci(55.0003e-4, 4), "5.5000E-03");
        assert_eq!(format_sci(1.0, 0), "1E+00");
    }

    #[test]
    fn renders_indented_parameter_line() {
        let line = render_parameter_line("VROT", &[0.0, 20.0, 36.0], 1);
        assert_eq!(line, "    VROT= 0.0E+00 2.0E+01 3.6E+01");
    }

    #[test]
    fn splice_replaces_in_place_and_preserves_the_rest() {
        let mut lines = vec![
            "# header".to_string(),
            "NUR= 3".to_string(),
            "VROT= 1 2 3".to_string(),
            "INCL= 60 60 60".to_string(),
        ];
        let replaced = splice_parameter(&mut lines, "VROT", &[5.0, 6.0, 7.0], 0, "km s-1");
        assert!(replaced);
        assert_eq!(lines[0], "# header");
        assert_eq!(lines[2], "    VROT= 5E+00 6E+00 7E+00");
        assert_eq!(lines[3], "INCL= 60 60 60");
    }

    #[test]
    fn splice_appends_comment_for_new_parameter() {
        let mut lines = vec!["NUR= 2".to_string()];
        let replaced = splice_parameter(&mut lines, "SDIS", &[0.0, 0.0], 1, "km s-1");
        assert!(!replaced);
        assert_eq!(lines[1], "# SDIS parameter in km s-1");
        assert_eq!(lines[2], "    SDIS= 0.0E+00 0.0E+00");
    }

    #[test]
    fn prepare_for_run_rewrites_fit_controls() {
        let lines: Vec<String> = [
            "ACTION= 0",
            "PROMPT= 1",
            "GR_DEVICE= /xs",
            "GR_CONT= something",
            "PROGRESSLOG= ",
            "VROT= 1 2 3",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let out = prepare_for_run(&lines);
        assert_eq!(
            out,
            vec![
                "ACTION = 1",
                "PROMPT = 0",
                "GR_DEVICE= /xs",
                "GR_CONT = ",
                "PROGRESSLOG = progress",
                "VROT= 1 2 3",
            ]
        );
    }
}
