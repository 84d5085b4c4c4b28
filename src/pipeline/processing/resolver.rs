use crate::config::Config;
use crate::pipeline::processing::catalog::GroupCatalog;
use crate::types::{Attendee, Track};
use std::collections::BTreeSet;
use tracing::trace;

/// The group option an attendee is deemed to have selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedChoice {
    pub option_id: i64,
    pub track: Track,
}

pub struct ChoiceResolver;

impl ChoiceResolver {
    /// Picks one winning option across the three selection questions.
    ///
    /// Suppressed options (cancellations, "choose a new date") count as 0 and
    /// the highest remaining option id wins. An attendee who cancelled track 1
    /// and booked track 2 therefore resolves to the track 2 booking. This is a
    /// heuristic: a stale booking with a larger id than the live one wins too.
    ///
    /// Returns `None` when nothing positive remains or the winner is not a
    /// group known to `catalog`.
    pub fn resolve(
        attendee: &Attendee,
        config: &Config,
        suppressed: &BTreeSet<i64>,
        catalog: &GroupCatalog,
    ) -> Option<ResolvedChoice> {
        let winner = attendee
            .answers
            .iter()
            .filter_map(|answer| answer.choice())
            .filter(|(question_id, _)| config.track_for_question(*question_id).is_some())
            .filter_map(|(_, option_id)| option_id)
            .map(|option_id| if suppressed.contains(&option_id) { 0 } else { option_id })
            .fold(0, |best, candidate| if candidate > best { candidate } else { best });

        if winner <= 0 {
            return None;
        }
        let (track, _) = catalog.find(winner)?;
        trace!(option_id = winner, %track, "Resolved choice");
        Some(ResolvedChoice { option_id: winner, track })
    }
}
