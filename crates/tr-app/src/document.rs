//! An open `.def` model: raw file lines plus the editable parameter set.

use std::path::{Path, PathBuf};

use tr_deffile::{DefFile, save_lines, splice_parameter, standard_unit};
use tr_model::{ParameterSet, RADIUS_AXIS, SeriesSamples};

use crate::error::AppResult;

/// Parameters shown when a file is first opened.
pub const DEFAULT_DISPLAYED: [&str; 4] = ["VROT", "SBR", "INCL", "PA"];

/// One open model file. Created when a file is opened, dropped when it is
/// closed or replaced; old and new state are never merged.
#[derive(Debug)]
pub struct DefDocument {
    path: PathBuf,
    def: DefFile,
    set: ParameterSet,
}

impl DefDocument {
    pub fn open(path: &Path) -> AppResult<Self> {
        let def = DefFile::load(path)?;
        let samples: Vec<SeriesSamples> = def
            .parameters
            .iter()
            .map(|p| {
                SeriesSamples::new(
                    p.name.clone(),
                    standard_unit(&p.name).unwrap_or(""),
                    p.values.clone(),
                    p.precision,
                )
            })
            .collect();
        let mut set = ParameterSet::load(def.ring_count, samples);
        set.set_displayed(&DEFAULT_DISPLAYED);
        tracing::info!(
            path = %path.display(),
            rings = set.ring_count(),
            displayed = set.displayed_order().len(),
            "opened model"
        );
        Ok(Self {
            path: path.to_path_buf(),
            def,
            set,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn inset(&self) -> &str {
        &self.def.inset
    }

    pub fn loops(&self) -> usize {
        self.def.loops
    }

    pub fn set(&self) -> &ParameterSet {
        &self.set
    }

    pub fn set_mut(&mut self) -> &mut ParameterSet {
        &mut self.set
    }

    /// The complete replacement line-set: every tracked parameter re-rendered
    /// at its recorded precision, everything else verbatim.
    fn rendered_lines(&self) -> Vec<String> {
        let mut lines = self.def.lines.clone();
        splice_parameter(
            &mut lines,
            RADIUS_AXIS,
            &self.set.radii(),
            self.set.x_precision(),
            standard_unit(RADIUS_AXIS).unwrap_or(""),
        );
        let names: Vec<String> = self.set.known_names().map(str::to_string).collect();
        for name in names {
            if let Some(series) = self.set.series(&name) {
                splice_parameter(
                    &mut lines,
                    &name,
                    series.y_values(),
                    series.y_precision(),
                    series.unit(),
                );
            }
        }
        lines
    }

    /// Save to the document's own path.
    pub fn save(&mut self) -> AppResult<()> {
        let path = self.path.clone();
        self.save_to(&path)
    }

    /// Save to `path` without adopting it as the document path (used for
    /// the editor-sync temp file).
    pub fn save_to(&mut self, path: &Path) -> AppResult<()> {
        let lines = self.rendered_lines();
        save_lines(path, &lines)?;
        self.def.lines = lines;
        Ok(())
    }

    /// Save to a new path and make it the document path.
    pub fn save_as(&mut self, path: &Path) -> AppResult<()> {
        self.save_to(path)?;
        self.path = path.to_path_buf();
        Ok(())
    }

    /// Sibling path of the data cube named by INSET.
    pub fn inset_path(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) => parent.join(&self.def.inset),
            None => PathBuf::from(&self.def.inset),
        }
    }

    /// Sibling scratch path used while an external editor owns the file.
    pub fn sync_temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp.def")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
INSET= cube.fits
LOOPS= 1
NUR= 4
RADI= 0.00E+00 4.00E+01 8.00E+01 1.20E+02
VROT= 2.00E+01 1.00E+02 1.20E+02 1.25E+02
SBR= 1.0E-03 1.0E-03 1.0E-03 1.0E-03
INCL= 6.10E+01 6.10E+01 6.10E+01 6.10E+01
PA= 3.00E+02 3.00E+02 3.00E+02 3.00E+02
";

    fn open_sample(dir: &tempfile::TempDir) -> DefDocument {
        let path = dir.path().join("model.def");
        std::fs::write(&path, SAMPLE).unwrap();
        DefDocument::open(&path).unwrap()
    }

    #[test]
    fn open_seeds_default_display_order() {
        let dir = tempfile::tempdir().unwrap();
        let doc = open_sample(&dir);
        assert_eq!(doc.set().displayed_order(), &["VROT", "SBR", "INCL", "PA"]);
        assert_eq!(doc.set().ring_count(), 4);
        assert_eq!(doc.loops(), 1);
        assert_eq!(doc.inset(), "cube.fits");
    }

    #[test]
    fn save_round_trips_an_edit() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = open_sample(&dir);
        {
            let (series, history) = doc.set_mut().series_and_history_mut("VROT").unwrap();
            series.set_value(0, 25.0).unwrap();
            history.record(series.y_values());
        }
        doc.save().unwrap();

        let reloaded = DefDocument::open(doc.path()).unwrap();
        assert_eq!(
            reloaded.set().series("VROT").unwrap().y_values(),
            &[25.0, 100.0, 120.0, 125.0]
        );
    }

    #[test]
    fn save_as_adopts_the_new_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = open_sample(&dir);
        let new_path = dir.path().join("copy.def");
        doc.save_as(&new_path).unwrap();
        assert_eq!(doc.path(), new_path);
        assert!(new_path.exists());
    }

    #[test]
    fn inset_path_is_a_sibling_of_the_def_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = open_sample(&dir);
        assert_eq!(doc.inset_path(), dir.path().join("cube.fits"));
    }
}
