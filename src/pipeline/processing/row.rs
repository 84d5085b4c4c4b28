use crate::app::ports::UserDirectory;
use crate::config::Config;
use crate::constants::{PROFILE_FIELD_COMPANY, PROFILE_FIELD_IMPORT};
use crate::error::{ImportError, Result};
use crate::pipeline::processing::mapper::Enrollment;
use crate::types::Attendee;
use serde::Serialize;
use tracing::{debug, info};

/// One line of the import feed, fields in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvRow {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub company_domain: String,
    pub import_marker: String,
    pub course_shortname: String,
    pub group_name: String,
    pub cohort_marker: String,
}

impl CsvRow {
    /// Joins the fields with commas. The importer reads the feed unquoted, so
    /// only the name fields are sanitized beforehand.
    pub fn to_csv_line(&self) -> String {
        [
            self.username.as_str(),
            self.firstname.as_str(),
            self.lastname.as_str(),
            self.email.as_str(),
            self.company_domain.as_str(),
            self.import_marker.as_str(),
            self.course_shortname.as_str(),
            self.group_name.as_str(),
            self.cohort_marker.as_str(),
        ]
        .join(",")
    }
}

pub struct CsvRowBuilder;

impl CsvRowBuilder {
    pub fn build(attendee: &Attendee, enrollment: &Enrollment, config: &Config) -> Result<CsvRow> {
        let identity = &config.identity;
        let first = Self::answer_text(attendee, identity.first_name_question_id)
            .ok_or(ImportError::MissingIdentityField("first name"))?;
        let last = Self::answer_text(attendee, identity.last_name_question_id)
            .ok_or(ImportError::MissingIdentityField("last name"))?;
        let raw_email = Self::answer_text(attendee, identity.email_question_id)
            .ok_or(ImportError::MissingIdentityField("email"))?;

        let email = raw_email.trim_matches(',').to_string();
        let username = email.to_lowercase();
        let company_domain = company_domain(&username).to_string();

        Ok(CsvRow {
            firstname: strip_name(first),
            lastname: strip_name(last),
            email,
            import_marker: config.feed.import_marker.clone(),
            course_shortname: enrollment.course_shortname.clone(),
            group_name: enrollment.group_name.clone(),
            cohort_marker: company_domain.clone(),
            company_domain,
            username,
        })
    }

    /// Writes the import marker and company domain onto an existing account.
    /// Returns whether an account matched. Upserts are keyed by field name, so
    /// repeating a run leaves the directory unchanged.
    pub fn sync_profile(row: &CsvRow, directory: &dyn UserDirectory) -> Result<bool> {
        let Some(user) = directory.find_by_email(&row.email)? else {
            debug!(email = %row.email, "No existing account");
            return Ok(false);
        };
        directory.upsert_profile_field(user, PROFILE_FIELD_IMPORT, &row.import_marker)?;
        directory.upsert_profile_field(user, PROFILE_FIELD_COMPANY, &row.company_domain)?;
        info!(email = %row.email, "Updated profile fields of existing user");
        Ok(true)
    }

    /// Last answer to `question_id` wins, matching how the form stores edits.
    fn answer_text(attendee: &Attendee, question_id: i64) -> Option<&str> {
        attendee
            .answers
            .iter()
            .rev()
            .find_map(|answer| answer.text_for(question_id))
    }
}

fn strip_name(name: &str) -> String {
    name.chars().filter(|c| *c != ',' && *c != '.').collect()
}

/// Everything after the last '@', empty when there is none.
fn company_domain(email: &str) -> &str {
    email.rsplit_once('@').map(|(_, domain)| domain).unwrap_or("")
}
