//! Desired PIM interface state and parameter validation.

use super::attributes::PolicyType;
use crate::modules::{ModuleError, ModuleParams, ModuleResult, ParamExt};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Parameters accepted by `nxos_pim_interface`
pub const SUPPORTED_PARAMS: &[&str] = &[
    "interface",
    "dr_prio",
    "hello_interval",
    "hello_interval_ms",
    "sparse",
    "border",
    "bfd",
    "jp_policy_in",
    "jp_policy_out",
    "jp_type_in",
    "jp_type_out",
    "neighbor_policy",
    "neighbor_type",
    "state",
];

/// Requested lifecycle of the interface PIM configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PimState {
    #[default]
    Present,
    Absent,
    Default,
}

impl PimState {
    /// Whether this state tears the PIM configuration down
    pub fn is_removal(self) -> bool {
        matches!(self, PimState::Absent | PimState::Default)
    }
}

impl FromStr for PimState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" => Ok(PimState::Present),
            "absent" => Ok(PimState::Absent),
            "default" => Ok(PimState::Default),
            _ => Err(format!(
                "Invalid state '{}'. Valid states: present, absent, default",
                s
            )),
        }
    }
}

/// Requested BFD setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BfdSetting {
    Enable,
    Disable,
    /// Remove any BFD line
    Default,
}

impl FromStr for BfdSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enable" => Ok(BfdSetting::Enable),
            "disable" => Ok(BfdSetting::Disable),
            "default" => Ok(BfdSetting::Default),
            _ => Err(format!(
                "Invalid bfd '{}'. Valid options: enable, disable, default",
                s
            )),
        }
    }
}

/// Desired PIM configuration for one interface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DesiredState {
    pub interface: String,
    pub dr_prio: Option<u32>,
    /// Seconds, or milliseconds when `hello_interval_ms` is set
    pub hello_interval: Option<u32>,
    pub hello_interval_ms: bool,
    pub sparse: Option<bool>,
    pub border: Option<bool>,
    pub bfd: Option<BfdSetting>,
    pub jp_policy_in: Option<String>,
    pub jp_policy_out: Option<String>,
    pub jp_type_in: Option<PolicyType>,
    pub jp_type_out: Option<PolicyType>,
    pub neighbor_policy: Option<String>,
    pub neighbor_type: Option<PolicyType>,
    pub state: PimState,
}

fn parse_enum<T: FromStr<Err = String>>(
    params: &ModuleParams,
    key: &str,
) -> ModuleResult<Option<T>> {
    params
        .get_string(key)?
        .map(|s| s.parse::<T>().map_err(ModuleError::InvalidParameter))
        .transpose()
}

impl DesiredState {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            ..Default::default()
        }
    }

    /// Build and validate the desired state from module parameters.
    pub fn from_params(params: &ModuleParams) -> ModuleResult<Self> {
        let mut unsupported: Vec<&str> = params
            .keys()
            .map(String::as_str)
            .filter(|k| !SUPPORTED_PARAMS.contains(k))
            .collect();
        if !unsupported.is_empty() {
            unsupported.sort_unstable();
            return Err(ModuleError::InvalidParameter(format!(
                "Unsupported parameters: {}",
                unsupported.join(", ")
            )));
        }

        let desired = Self {
            interface: params.get_string_required("interface")?,
            dr_prio: params.get_u32("dr_prio")?,
            hello_interval: params.get_u32("hello_interval")?,
            hello_interval_ms: params.get_bool("hello_interval_ms")?.unwrap_or(false),
            sparse: params.get_bool("sparse")?,
            border: params.get_bool("border")?,
            bfd: parse_enum(params, "bfd")?,
            jp_policy_in: params.get_string("jp_policy_in")?,
            jp_policy_out: params.get_string("jp_policy_out")?,
            jp_type_in: parse_enum(params, "jp_type_in")?,
            jp_type_out: parse_enum(params, "jp_type_out")?,
            neighbor_policy: params.get_string("neighbor_policy")?,
            neighbor_type: parse_enum(params, "neighbor_type")?,
            state: parse_enum(params, "state")?.unwrap_or_default(),
        };

        desired.validate()?;
        Ok(desired)
    }

    /// Check field combinations that the parameter types alone cannot express.
    pub fn validate(&self) -> ModuleResult<()> {
        if self.interface.trim().is_empty() {
            return Err(ModuleError::MissingParameter("interface".to_string()));
        }

        match self.hello_interval {
            Some(0) => {
                return Err(ModuleError::InvalidParameter(
                    "hello_interval must be greater than 0".to_string(),
                ))
            }
            Some(v) if !self.hello_interval_ms && v.checked_mul(1000).is_none() => {
                return Err(ModuleError::InvalidParameter(format!(
                    "hello_interval {} seconds is out of range",
                    v
                )))
            }
            _ => {}
        }

        let pairs = [
            ("jp_type_in", self.jp_type_in, "jp_policy_in", &self.jp_policy_in),
            ("jp_type_out", self.jp_type_out, "jp_policy_out", &self.jp_policy_out),
            (
                "neighbor_type",
                self.neighbor_type,
                "neighbor_policy",
                &self.neighbor_policy,
            ),
        ];
        for (type_key, kind, policy_key, policy) in pairs {
            if kind.is_some() && policy.is_none() {
                return Err(ModuleError::InvalidParameter(format!(
                    "{} requires {}",
                    type_key, policy_key
                )));
            }
        }

        Ok(())
    }

    /// The requested hello interval in milliseconds.
    pub fn hello_interval_millis(&self) -> Option<u32> {
        self.hello_interval.and_then(|v| {
            if self.hello_interval_ms {
                Some(v)
            } else {
                v.checked_mul(1000)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> ModuleParams {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_from_params_minimal() {
        let desired = DesiredState::from_params(&params(json!({"interface": "eth2/1"}))).unwrap();
        assert_eq!(desired, DesiredState::new("eth2/1"));
        assert_eq!(desired.state, PimState::Present);
    }

    #[test]
    fn test_from_params_full() {
        let desired = DesiredState::from_params(&params(json!({
            "interface": "eth2/1",
            "dr_prio": 10,
            "hello_interval": "40",
            "sparse": true,
            "border": "no",
            "bfd": "disable",
            "jp_policy_in": "JPIN",
            "jp_type_in": "prefix",
            "neighbor_policy": "NBR",
            "state": "present"
        })))
        .unwrap();

        assert_eq!(desired.dr_prio, Some(10));
        assert_eq!(desired.hello_interval_millis(), Some(40_000));
        assert_eq!(desired.sparse, Some(true));
        assert_eq!(desired.border, Some(false));
        assert_eq!(desired.bfd, Some(BfdSetting::Disable));
        assert_eq!(desired.jp_type_in, Some(PolicyType::Prefix));
        assert_eq!(desired.neighbor_type, None);
    }

    #[test]
    fn test_missing_interface() {
        let err = DesiredState::from_params(&params(json!({"dr_prio": 1}))).unwrap_err();
        assert!(matches!(err, ModuleError::MissingParameter(_)));
    }

    #[test]
    fn test_type_without_policy_rejected() {
        let err = DesiredState::from_params(&params(json!({
            "interface": "eth2/1",
            "jp_type_out": "routemap"
        })))
        .unwrap_err();
        assert!(err.to_string().contains("jp_type_out requires jp_policy_out"));

        let err = DesiredState::from_params(&params(json!({
            "interface": "eth2/1",
            "neighbor_type": "prefix"
        })))
        .unwrap_err();
        assert!(matches!(err, ModuleError::InvalidParameter(_)));
    }

    #[test]
    fn test_hello_interval_bounds() {
        let mut desired = DesiredState::new("eth2/1");
        desired.hello_interval = Some(0);
        assert!(desired.validate().is_err());

        desired.hello_interval = Some(u32::MAX / 100);
        assert!(desired.validate().is_err());

        desired.hello_interval_ms = true;
        assert!(desired.validate().is_ok());
        assert_eq!(desired.hello_interval_millis(), Some(u32::MAX / 100));
    }

    #[test]
    fn test_invalid_enum_values() {
        for (key, value) in [("bfd", "on"), ("state", "gone"), ("jp_type_in", "acl")] {
            let mut p = params(json!({"interface": "eth2/1", "jp_policy_in": "JPIN"}));
            p.insert(key.to_string(), json!(value));
            let err = DesiredState::from_params(&p).unwrap_err();
            assert!(matches!(err, ModuleError::InvalidParameter(_)), "{key}");
        }
    }

    #[test]
    fn test_unsupported_parameter() {
        let err = DesiredState::from_params(&params(json!({
            "interface": "eth2/1",
            "dr_priority": 5
        })))
        .unwrap_err();
        assert!(err.to_string().contains("dr_priority"));
    }

    #[test]
    fn test_state_removal() {
        assert!(!PimState::Present.is_removal());
        assert!(PimState::Absent.is_removal());
        assert!(PimState::Default.is_removal());
        assert_eq!("DEFAULT".parse::<PimState>().unwrap(), PimState::Default);
    }
}
