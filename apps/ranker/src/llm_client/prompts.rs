// Cross-cutting prompt fragments shared by every backend.

/// System message sent with every ranking request.
pub const HR_EVALUATOR_SYSTEM: &str = "You are an expert HR evaluator.";
