use std::collections::HashMap;
use thiserror::Error;

/// Maximum nesting depth accepted during evaluation.
pub const MAX_POLICY_DEPTH: usize = 16;

/// Policy evaluation failure. Always fails closed at the decision layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A comparison referenced an attribute that is absent from the input.
    #[error("unknown attribute {subject}.{key}")]
    UnknownAttribute { subject: Subject, key: String },
    /// Policy nesting exceeded [`MAX_POLICY_DEPTH`].
    #[error("policy nesting exceeds max depth {max}")]
    DepthExceeded { max: usize },
}

/// Side of the authorization check an attribute belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Subject {
    /// The acting user's effective assignment (`user`, `tenant`, `branch`, `role`).
    Actor,
    /// The resource being acted on (`tenant`, `owner`, `branch`, custom attrs).
    Resource,
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Subject::Actor => "actor",
            Subject::Resource => "resource",
        })
    }
}

/// Reference to one attribute, e.g. `resource.branch`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttrPath {
    pub subject: Subject,
    pub key: String,
}

/// Comparison operand: an attribute reference or a literal value.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    Attr(AttrPath),
    Value(String),
}

impl Operand {
    /// Actor-side attribute reference.
    pub fn actor(key: impl Into<String>) -> Self {
        Operand::Attr(AttrPath {
            subject: Subject::Actor,
            key: key.into(),
        })
    }

    /// Resource-side attribute reference.
    pub fn resource(key: impl Into<String>) -> Self {
        Operand::Attr(AttrPath {
            subject: Subject::Resource,
            key: key.into(),
        })
    }

    /// Literal value.
    pub fn value(value: impl Into<String>) -> Self {
        Operand::Value(value.into())
    }
}

/// Structured ABAC condition attached to a permission grant.
///
/// A policy can only narrow what the grant's scope already allows; the
/// evaluator combines both with AND semantics. A policy that cannot be
/// evaluated (missing attribute, excessive nesting) is an error, never a
/// silent pass.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Policy {
    /// Both operands resolve to the same value.
    Eq(Operand, Operand),
    /// Operands resolve to different values.
    Ne(Operand, Operand),
    /// Left operand resolves to one of the listed values.
    In(Operand, Vec<String>),
    /// Every child holds. `All([])` is vacuously true.
    All(Vec<Policy>),
    /// At least one child holds. `Any([])` is vacuously false.
    Any(Vec<Policy>),
    /// Child does not hold.
    Not(Box<Policy>),
}

/// Attribute bags the policy is evaluated against.
pub(crate) struct PolicyInput<'a> {
    pub actor: &'a HashMap<String, String>,
    pub resource: &'a HashMap<String, String>,
}

impl Policy {
    pub(crate) fn evaluate(&self, input: &PolicyInput<'_>) -> Result<bool, PolicyError> {
        self.evaluate_at(input, 0)
    }

    fn evaluate_at(&self, input: &PolicyInput<'_>, depth: usize) -> Result<bool, PolicyError> {
        if depth > MAX_POLICY_DEPTH {
            return Err(PolicyError::DepthExceeded {
                max: MAX_POLICY_DEPTH,
            });
        }
        match self {
            Policy::Eq(left, right) => {
                Ok(resolve(left, input)? == resolve(right, input)?)
            }
            Policy::Ne(left, right) => {
                Ok(resolve(left, input)? != resolve(right, input)?)
            }
            Policy::In(operand, values) => {
                let resolved = resolve(operand, input)?;
                Ok(values.iter().any(|value| value == resolved))
            }
            Policy::All(children) => {
                for child in children {
                    if !child.evaluate_at(input, depth + 1)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Policy::Any(children) => {
                for child in children {
                    if child.evaluate_at(input, depth + 1)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Policy::Not(child) => Ok(!child.evaluate_at(input, depth + 1)?),
        }
    }
}

fn resolve<'a>(
    operand: &'a Operand,
    input: &'a PolicyInput<'_>,
) -> Result<&'a str, PolicyError> {
    match operand {
        Operand::Value(value) => Ok(value),
        Operand::Attr(path) => {
            let bag = match path.subject {
                Subject::Actor => input.actor,
                Subject::Resource => input.resource,
            };
            bag.get(&path.key)
                .map(String::as_str)
                .ok_or_else(|| PolicyError::UnknownAttribute {
                    subject: path.subject,
                    key: path.key.clone(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_with(
        actor: &[(&str, &str)],
        resource: &[(&str, &str)],
    ) -> (HashMap<String, String>, HashMap<String, String>) {
        let to_map = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };
        (to_map(actor), to_map(resource))
    }

    #[test]
    fn eq_should_match_actor_and_resource_attributes() {
        let (actor, resource) = input_with(&[("branch", "b2")], &[("branch", "b2")]);
        let policy = Policy::Eq(Operand::resource("branch"), Operand::actor("branch"));

        let result = policy.evaluate(&PolicyInput {
            actor: &actor,
            resource: &resource,
        });
        assert_eq!(result, Ok(true));
    }

    #[test]
    fn eq_should_fail_on_missing_attribute() {
        let (actor, resource) = input_with(&[], &[("branch", "b2")]);
        let policy = Policy::Eq(Operand::resource("branch"), Operand::actor("branch"));

        let result = policy.evaluate(&PolicyInput {
            actor: &actor,
            resource: &resource,
        });
        assert!(matches!(
            result,
            Err(PolicyError::UnknownAttribute {
                subject: Subject::Actor,
                ..
            })
        ));
    }

    #[test]
    fn in_should_match_listed_values() {
        let (actor, resource) = input_with(&[], &[("kind", "lecture")]);
        let policy = Policy::In(
            Operand::resource("kind"),
            vec!["lecture".to_string(), "seminar".to_string()],
        );

        let result = policy.evaluate(&PolicyInput {
            actor: &actor,
            resource: &resource,
        });
        assert_eq!(result, Ok(true));
    }

    #[test]
    fn any_of_nothing_is_false_and_all_of_nothing_is_true() {
        let (actor, resource) = input_with(&[], &[]);
        let input = PolicyInput {
            actor: &actor,
            resource: &resource,
        };

        assert_eq!(Policy::Any(vec![]).evaluate(&input), Ok(false));
        assert_eq!(Policy::All(vec![]).evaluate(&input), Ok(true));
    }

    #[test]
    fn not_should_invert_child() {
        let (actor, resource) = input_with(&[], &[("status", "closed")]);
        let policy = Policy::Not(Box::new(Policy::Eq(
            Operand::resource("status"),
            Operand::value("closed"),
        )));

        let result = policy.evaluate(&PolicyInput {
            actor: &actor,
            resource: &resource,
        });
        assert_eq!(result, Ok(false));
    }

    #[test]
    fn nesting_beyond_max_depth_is_an_error() {
        let mut policy = Policy::Eq(Operand::value("x"), Operand::value("x"));
        for _ in 0..=MAX_POLICY_DEPTH {
            policy = Policy::Not(Box::new(policy));
        }

        let (actor, resource) = input_with(&[], &[]);
        let result = policy.evaluate(&PolicyInput {
            actor: &actor,
            resource: &resource,
        });
        assert!(matches!(result, Err(PolicyError::DepthExceeded { .. })));
    }
}
