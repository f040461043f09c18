use shared_types::CellPaint;

/// Whether `candidate` should replace `current` in a cell.
///
/// Settled paint beats provisional paint, then the later timestamp wins.
/// Equal timestamps go to the larger event id, so the outcome does not
/// depend on which event arrived first.
pub fn supersedes(candidate: &CellPaint, current: Option<&CellPaint>) -> bool {
    let Some(current) = current else {
        return true;
    };
    if candidate.event_id == current.event_id {
        return candidate.valid && !current.valid;
    }
    match (candidate.valid, current.valid) {
        (true, false) => true,
        (false, true) => false,
        _ => {
            (candidate.timestamp, &candidate.event_id) > (current.timestamp, &current.event_id)
        }
    }
}
