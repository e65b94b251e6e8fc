//! Command rendering for attribute deltas.

use super::attributes::{
    AttrValue, Attribute, AttributeDelta, BfdMode, DeltaAction, Direction, ResetStyle,
};

/// The configuration line that sets `value`.
pub fn set_command(value: &AttrValue) -> String {
    let keyword = value.attribute().rule().keyword;
    match value {
        AttrValue::DrPriority(v) | AttrValue::HelloInterval(v) => format!("{} {}", keyword, v),
        AttrValue::JpPolicy(direction, binding) => match direction {
            Direction::In => format!("{} {} in", keyword, binding),
            Direction::Out => format!("{} {} out", keyword, binding),
            Direction::Both => format!("{} {}", keyword, binding),
        },
        AttrValue::NeighborPolicy(binding) => format!("{} {}", keyword, binding),
        AttrValue::SparseMode | AttrValue::Border => keyword.to_string(),
        AttrValue::Bfd(BfdMode::Enable) => keyword.to_string(),
        AttrValue::Bfd(BfdMode::Disable) => format!("{} disable", keyword),
    }
}

/// The line that returns `attribute` to its device default.
///
/// Policies have to name the binding being removed; without one the bare
/// keyword is negated.
pub fn negate_command(attribute: Attribute, current: Option<&AttrValue>) -> String {
    let rule = attribute.rule();
    match (rule.reset, current) {
        (ResetStyle::NegateBinding, Some(value)) => format!("no {}", set_command(value)),
        _ => format!("no {}", rule.keyword),
    }
}

/// Render one delta into its commands. `NoOp` renders nothing.
pub fn render(delta: &AttributeDelta) -> Vec<String> {
    match (delta.action, &delta.desired) {
        (DeltaAction::Set, Some(value)) => vec![set_command(value)],
        (DeltaAction::Negate, _) => vec![negate_command(delta.attribute, delta.current.as_ref())],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::network::nxos_pim_interface::attributes::{PolicyBinding, PolicyType};

    #[test]
    fn test_set_commands() {
        assert_eq!(set_command(&AttrValue::DrPriority(10)), "ip pim dr-priority 10");
        assert_eq!(
            set_command(&AttrValue::HelloInterval(40000)),
            "ip pim hello-interval 40000"
        );
        assert_eq!(set_command(&AttrValue::SparseMode), "ip pim sparse-mode");
        assert_eq!(set_command(&AttrValue::Border), "ip pim border");
        assert_eq!(set_command(&AttrValue::Bfd(BfdMode::Enable)), "ip pim bfd-instance");
        assert_eq!(
            set_command(&AttrValue::Bfd(BfdMode::Disable)),
            "ip pim bfd-instance disable"
        );
        assert_eq!(
            set_command(&AttrValue::JpPolicy(
                Direction::Out,
                PolicyBinding::new("JPOUT", PolicyType::Routemap)
            )),
            "ip pim jp-policy JPOUT out"
        );
        assert_eq!(
            set_command(&AttrValue::NeighborPolicy(PolicyBinding::new(
                "NBR",
                PolicyType::Prefix
            ))),
            "ip pim neighbor-policy prefix-list NBR"
        );
    }

    #[test]
    fn test_negate_commands() {
        assert_eq!(
            negate_command(Attribute::Bfd, Some(&AttrValue::Bfd(BfdMode::Disable))),
            "no ip pim bfd-instance"
        );
        assert_eq!(
            negate_command(Attribute::DrPriority, Some(&AttrValue::DrPriority(10))),
            "no ip pim dr-priority"
        );
        assert_eq!(
            negate_command(
                Attribute::JpPolicyIn,
                Some(&AttrValue::JpPolicy(
                    Direction::Both,
                    PolicyBinding::new("BOTH", PolicyType::Routemap)
                ))
            ),
            "no ip pim jp-policy BOTH"
        );
        assert_eq!(negate_command(Attribute::Border, None), "no ip pim border");
    }

    #[test]
    fn test_render_noop_is_empty() {
        let delta = AttributeDelta {
            attribute: Attribute::SparseMode,
            desired: None,
            current: Some(AttrValue::SparseMode),
            action: DeltaAction::NoOp,
        };
        assert!(render(&delta).is_empty());
    }
}
