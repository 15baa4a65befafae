use serde::Serialize;

/// What a gateway response code means for the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayOutcome {
    Success,
    Failed,
    /// Inconclusive. Nothing is written and the caller polls again.
    Pending,
}

impl GatewayOutcome {
    pub fn from_code(code: &str) -> Self {
        match code {
            "PAYMENT_SUCCESS" => GatewayOutcome::Success,
            "PAYMENT_ERROR" | "PAYMENT_DECLINED" | "TIMED_OUT" | "PAYMENT_CANCELLED" => {
                GatewayOutcome::Failed
            }
            _ => GatewayOutcome::Pending,
        }
    }
}
