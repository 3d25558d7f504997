use thiserror::Error;

/// Domain errors surfaced by the sizing and projection engines
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DesignError {
    #[error("Missing component data: {component} has no {field}")]
    MissingComponentData {
        component: &'static str,
        field: &'static str,
    },

    #[error(
        "Infeasible voltage window: at least {min_modules} modules per string required but at most {max_modules} allowed"
    )]
    InfeasibleVoltageWindow { min_modules: u32, max_modules: u32 },

    #[error("Invalid range: {field} = {value} (expected {expected})")]
    InvalidRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("Division by zero: {0}")]
    DivisionByZero(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type DesignResult<T> = Result<T, DesignError>;

impl DesignError {
    pub fn invalid_range(field: &'static str, value: f64, expected: &'static str) -> Self {
        DesignError::InvalidRange {
            field,
            value,
            expected,
        }
    }

    pub fn missing(component: &'static str, field: &'static str) -> Self {
        DesignError::MissingComponentData { component, field }
    }

    /// Stable kind name, used when mapping to caller-facing responses
    pub fn kind(&self) -> &'static str {
        match self {
            DesignError::MissingComponentData { .. } => "MissingComponentData",
            DesignError::InfeasibleVoltageWindow { .. } => "InfeasibleVoltageWindow",
            DesignError::InvalidRange { .. } => "InvalidRange",
            DesignError::DivisionByZero(_) => "DivisionByZero",
            DesignError::Validation(_) => "Validation",
        }
    }
}

impl From<validator::ValidationErrors> for DesignError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DesignError::Validation(errors.to_string())
    }
}

/// Reject NaN and infinities before they reach any arithmetic
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> DesignResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DesignError::invalid_range(field, value, "a finite number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            DesignError::missing("panel", "voc").kind(),
            "MissingComponentData"
        );
        assert_eq!(
            DesignError::DivisionByZero("energy NPV").kind(),
            "DivisionByZero"
        );
        assert_eq!(
            DesignError::InfeasibleVoltageWindow {
                min_modules: 10,
                max_modules: 8
            }
            .kind(),
            "InfeasibleVoltageWindow"
        );
    }

    #[test]
    fn test_error_display() {
        let error = DesignError::invalid_range("capacity_mw", -1.0, "> 0");
        assert_eq!(
            error.to_string(),
            "Invalid range: capacity_mw = -1 (expected > 0)"
        );

        let error = DesignError::missing("inverter", "vdc_max");
        assert_eq!(
            error.to_string(),
            "Missing component data: inverter has no vdc_max"
        );
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite("x", 1.5), Ok(1.5));
        assert!(ensure_finite("x", f64::NAN).is_err());
        assert!(ensure_finite("x", f64::INFINITY).is_err());
    }
}
