use serde::Serialize;

use crate::trace::{MethodLevel, ROOT_CALLER, TraceRecord};

/// What a token under the cursor was observed to be at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evaluation {
    Method(MethodEvaluation),
    Class(ClassEvaluation),
    Instance(InstanceEvaluation),
}

/// A recorded call, without the call-site location it was looked up by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodEvaluation {
    pub entity: String,
    pub method_name: String,
    pub method_level: String,
    pub caller_entity: String,
    pub caller_method_name: String,
    pub caller_method_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassEvaluation {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceEvaluation {
    pub class: ClassEvaluation,
}

impl Evaluation {
    /// The token is the method name of `record`.
    pub fn method(record: &TraceRecord) -> Self {
        Evaluation::Method(MethodEvaluation {
            entity: record.entity.clone(),
            method_name: record.method_name.clone(),
            method_level: record.method_level.clone(),
            caller_entity: record.caller_entity.clone(),
            caller_method_name: record.caller_method_name.clone(),
            caller_method_level: record.caller_method_level.clone(),
        })
    }

    /// The token is the receiver of `record`'s call: the class itself for a
    /// class-level call, an instance of it otherwise.
    pub fn entity(record: &TraceRecord) -> Self {
        let class = ClassEvaluation {
            name: record.entity.clone(),
        };
        match record.level() {
            MethodLevel::Class => Evaluation::Class(class),
            MethodLevel::Instance => Evaluation::Instance(InstanceEvaluation { class }),
        }
    }
}

impl MethodEvaluation {
    pub fn level(&self) -> MethodLevel {
        MethodLevel::from_label(&self.method_level)
    }

    pub fn caller_level(&self) -> MethodLevel {
        MethodLevel::from_label(&self.caller_method_level)
    }

    /// False for top-level calls recorded with the `<ROOT>` caller.
    pub fn has_caller(&self) -> bool {
        self.caller_entity != ROOT_CALLER
    }

    /// `Entity.method` or `Entity#method`.
    pub fn qualified_name(&self) -> String {
        format!("{}{}{}", self.entity, self.level().separator(), self.method_name)
    }

    pub fn qualified_caller(&self) -> String {
        format!(
            "{}{}{}",
            self.caller_entity,
            self.caller_level().separator(),
            self.caller_method_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(method_level: &str, caller_entity: &str) -> TraceRecord {
        TraceRecord {
            entity: "Noisemaker".to_string(),
            method_name: "speak".to_string(),
            method_level: method_level.to_string(),
            filepath: "dog.rb".to_string(),
            lineno: "5".to_string(),
            caller_entity: caller_entity.to_string(),
            caller_method_name: "bark".to_string(),
            caller_method_level: "instance".to_string(),
        }
    }

    #[test]
    fn test_method_evaluation_copies_record() {
        let eval = Evaluation::method(&record("class", "Dog"));
        let Evaluation::Method(method) = eval else {
            panic!("expected method evaluation");
        };
        assert_eq!(method.entity, "Noisemaker");
        assert_eq!(method.method_name, "speak");
        assert_eq!(method.method_level, "class");
        assert_eq!(method.caller_entity, "Dog");
        assert_eq!(method.qualified_name(), "Noisemaker.speak");
        assert_eq!(method.qualified_caller(), "Dog#bark");
        assert!(method.has_caller());
    }

    #[test]
    fn test_root_caller() {
        let Evaluation::Method(method) = Evaluation::method(&record("instance", "<ROOT>")) else {
            panic!("expected method evaluation");
        };
        assert!(!method.has_caller());
        assert_eq!(method.qualified_name(), "Noisemaker#speak");
    }

    #[test]
    fn test_entity_evaluation_by_level() {
        assert_eq!(
            Evaluation::entity(&record("class", "Dog")),
            Evaluation::Class(ClassEvaluation {
                name: "Noisemaker".to_string()
            })
        );
        assert_eq!(
            Evaluation::entity(&record("instance", "Dog")),
            Evaluation::Instance(InstanceEvaluation {
                class: ClassEvaluation {
                    name: "Noisemaker".to_string()
                }
            })
        );
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(Evaluation::entity(&record("instance", "Dog"))).unwrap();
        assert_eq!(value, serde_json::json!({ "kind": "instance", "class": { "name": "Noisemaker" } }));

        let value = serde_json::to_value(Evaluation::method(&record("class", "<ROOT>"))).unwrap();
        assert_eq!(value["kind"], "method");
        assert_eq!(value["entity"], "Noisemaker");
        assert!(value.get("filepath").is_none());
        assert!(value.get("lineno").is_none());
    }
}
