//! Compiled keyword patterns.

use pave_common::{Error, ProjectType, Result};
use pave_config::{ModeProfile, Patterns};
use regex::{Regex, RegexBuilder};

/// All regular expressions one classifier run needs, compiled once.
#[derive(Debug, Clone)]
pub struct Matchers {
    moratorium: Regex,
    exclusion: Regex,
    concrete: Regex,
    slurry: Regex,
    overlay: Regex,
}

impl Matchers {
    pub fn new(patterns: &Patterns, profile: &ModeProfile) -> Result<Self> {
        Ok(Self {
            moratorium: compile("patterns.moratorium", &patterns.moratorium)?,
            exclusion: compile("exclusion_pattern", &profile.exclusion_pattern)?,
            concrete: compile("patterns.concrete", &patterns.concrete)?,
            slurry: compile("patterns.slurry", &patterns.slurry)?,
            overlay: compile("patterns.overlay", &patterns.overlay)?,
        })
    }

    /// Status is some spelling of post-construction or moratorium.
    pub fn is_moratorium(&self, status: &str) -> bool {
        self.moratorium.is_match(status)
    }

    pub fn is_excluded(&self, activity: &str) -> bool {
        self.exclusion.is_match(activity)
    }

    /// Project type for a job activity.
    ///
    /// The masks are applied concrete, slurry, overlay; a later match wins.
    pub fn project_type(&self, activity: &str) -> Option<ProjectType> {
        let mut assigned = None;
        if self.concrete.is_match(activity) {
            assigned = Some(ProjectType::Concrete);
        }
        if self.slurry.is_match(activity) {
            assigned = Some(ProjectType::Slurry);
        }
        if self.overlay.is_match(activity) {
            assigned = Some(ProjectType::Overlay);
        }
        assigned
    }
}

fn compile(field: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Config(format!("{field}: invalid regex: {e}")))
}
