use log::debug;

pub const STARTING_LOAD_KG: f32 = 20.0;

/// Suggested load for the next session of an exercise.
///
/// Without prior history the empty bar is suggested. After a successful
/// session the load increases by 2.5 kg for low-rep goals (at most 6 reps) and
/// by 2.0 kg otherwise. After a failed session the load stays the same.
#[must_use]
pub fn next_load(current_kg: Option<f32>, success: bool, rep_goal: u32) -> f32 {
    debug!("calculating next load: current={current_kg:?} success={success} rep_goal={rep_goal}");
    let Some(current_kg) = current_kg else {
        return STARTING_LOAD_KG;
    };
    if !success {
        return current_kg;
    }
    let increment = if rep_goal <= 6 { 2.5 } else { 2.0 };
    ((current_kg + increment) * 10.0).round() / 10.0
}

#[must_use]
pub fn should_deload(fails_in_row: u32) -> bool {
    fails_in_row >= 2
}
