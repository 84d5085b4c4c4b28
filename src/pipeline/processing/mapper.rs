use crate::config::Config;
use crate::error::{ImportError, Result};
use crate::pipeline::processing::catalog::GroupCatalog;
use crate::pipeline::processing::resolver::ResolvedChoice;
use crate::types::Language;
use serde::Serialize;

/// Course and group an attendee is enrolled into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enrollment {
    pub course_shortname: String,
    pub group_name: String,
}

/// Maps resolved choices back onto the catalog and the configured courses
pub struct EnrollmentMapper;

impl EnrollmentMapper {
    pub fn map(choice: &ResolvedChoice, catalog: &GroupCatalog, config: &Config) -> Result<Enrollment> {
        let (track, entry) = catalog
            .find(choice.option_id)
            .ok_or(ImportError::UnknownOption(choice.option_id))?;
        let track_config = config.track(track);

        let course_shortname = match entry.language {
            Language::German => &track_config.course_shortname_de,
            Language::English => &track_config.course_shortname_en,
        };

        Ok(Enrollment {
            course_shortname: course_shortname.clone(),
            group_name: entry.name.clone(),
        })
    }
}
