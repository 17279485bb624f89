/// Abort signal sent when the poll loop should stop.
/// Sent from the ctrl-c handler; receiving it ends the loop before the next cycle.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    pub reason: String,
}
