use crate::model::participant::Participant;

use super::table::ParticipantTable;

#[tracing::instrument(skip(table))]
pub fn most_recent_first(table: &ParticipantTable) -> Vec<Participant> {
    table
        .created_at_index
        .iter_descending()
        .filter_map(|id| table.participant_rows.get(id))
        .map(|row| row.participant.clone())
        .collect()
}

#[tracing::instrument(skip(table))]
pub fn find_by_email(table: &ParticipantTable, email: &str) -> Option<Participant> {
    table
        .unique_email_index
        .get(email)
        .and_then(|id| table.participant_rows.get(id))
        .map(|row| row.participant.clone())
}
