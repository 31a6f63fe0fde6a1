//! Form model tests: field ordering, logic rules and section updates.
mod common;
use common::*;
use sekkei::model::{ActionKind, Operator};
use sekkei::prelude::*;
use serde_json::json;

fn orders(model: &FormModel) -> Vec<(String, i32)> {
    model
        .sorted_fields()
        .iter()
        .map(|f| (f.id.clone(), f.order))
        .collect()
}

#[cfg(test)]
mod field_tests {
    use super::*;

    #[test]
    fn test_two_adds_get_distinct_ids_and_orders() {
        let mut model = FormModel::new();
        let a = model.add_field(FieldKind::Text);
        let b = model.add_field(FieldKind::Text);
        assert_ne!(a, b);
        assert_eq!(
            orders(&model),
            vec![("field_1".to_string(), 0), ("field_2".to_string(), 1)]
        );
        assert_eq!(model.find_field(&b).unwrap().label, "单行文本");

        let validators = ValidatorRegistry::default();
        let ctx = sekkei::wizard::ValidationContext {
            model: &model,
            frame_report: None,
        };
        assert!(validators.validate(2, &ctx).is_valid);

        assert_eq!(model.move_field_up(&b), Ok(true));
        assert_eq!(orders(&model), vec![(b, 0), (a, 1)]);
    }

    #[test]
    fn test_delete_compacts_orders() {
        let mut model = FormModel::new();
        let a = model.add_field(FieldKind::Text);
        let b = model.add_field(FieldKind::Number);
        let c = model.add_field(FieldKind::Date);
        model.delete_field(&b).unwrap();
        assert_eq!(orders(&model), vec![(a, 0), (c.clone(), 1)]);
        // The next field goes after the compacted tail.
        let d = model.add_field(FieldKind::Time);
        assert_eq!(model.find_field(&d).unwrap().order, 2);
        assert_ne!(d, b);
    }

    #[test]
    fn test_add_after_maximal_order_from_a_frame() {
        let mut model = FormModel::new();
        model
            .apply_section(
                "fields",
                json!([
                    {"id": "field_1", "type": "text", "label": "姓名", "order": i32::MAX},
                    {"id": "field_2", "type": "date", "label": "日期", "order": 5}
                ]),
            )
            .unwrap();
        let added = model.add_field(FieldKind::Number);
        assert_eq!(
            orders(&model),
            vec![
                ("field_2".to_string(), 0),
                ("field_1".to_string(), 1),
                (added, 2)
            ]
        );
    }

    #[test]
    fn test_moves_stop_at_the_edges() {
        let mut model = complete_model();
        assert_eq!(model.move_field_up("field_1"), Ok(false));
        assert_eq!(model.move_field_down("field_2"), Ok(false));
        assert_eq!(model.move_field_down("field_1"), Ok(true));
        assert_eq!(
            orders(&model),
            vec![("field_2".to_string(), 0), ("field_1".to_string(), 1)]
        );
        assert_eq!(
            model.move_field_up("field_9"),
            Err(ModelError::FieldNotFound("field_9".to_string()))
        );
    }

    #[test]
    fn test_width_is_clamped() {
        let mut model = complete_model();
        model
            .update_field(
                "field_1",
                FieldPatch {
                    width: Some(250),
                    ..FieldPatch::default()
                },
            )
            .unwrap();
        assert_eq!(model.find_field("field_1").unwrap().width, 100);
    }
}

#[cfg(test)]
mod rule_tests {
    use super::*;

    #[test]
    fn test_rule_targets_must_exist() {
        let mut model = complete_model();
        let draft = RuleDraft::new("field_1", Operator::Empty, ActionKind::Hide, "field_9");
        assert!(matches!(
            model.save_logic_rule(draft, None),
            Err(ModelError::InvalidRule(_))
        ));

        let divider = model.add_field(FieldKind::Divider);
        let draft = RuleDraft::new("field_1", Operator::Empty, ActionKind::Hide, divider);
        assert!(model.save_logic_rule(draft, None).is_err());
        assert!(model.logic_rules.is_empty());
    }

    #[test]
    fn test_value_operators_need_a_value() {
        let mut model = complete_model();
        let draft = RuleDraft::new("field_2", Operator::Eq, ActionKind::Required, "field_1");
        assert_eq!(
            model.save_logic_rule(draft.clone(), None),
            Err(ModelError::InvalidRule(
                "please enter a condition value".to_string()
            ))
        );
        let id = model
            .save_logic_rule(draft.with_condition_value("选项1"), None)
            .unwrap();
        assert_eq!(
            model.describe_rule(&model.logic_rules[0]),
            "当 部门 等于 选项1 → 设为必填 姓名"
        );
        assert!(id.starts_with("rule_"));
    }

    #[test]
    fn test_editing_replaces_in_place() {
        let mut model = complete_model();
        let draft = RuleDraft::new("field_1", Operator::NotEmpty, ActionKind::Show, "field_2");
        let id = model.save_logic_rule(draft, None).unwrap();
        let edited = RuleDraft::new("field_1", Operator::Empty, ActionKind::Hide, "field_2");
        assert_eq!(model.save_logic_rule(edited, Some(&id)), Ok(id.clone()));
        assert_eq!(model.logic_rules.len(), 1);
        assert_eq!(model.logic_rules[0].action.kind, ActionKind::Hide);
        assert!(matches!(
            model.save_logic_rule(
                RuleDraft::new("field_1", Operator::Empty, ActionKind::Hide, "field_2"),
                Some("rule_404")
            ),
            Err(ModelError::RuleNotFound(_))
        ));
    }

    #[test]
    fn test_deleting_a_field_drops_its_rules() {
        let mut model = complete_model();
        let draft = RuleDraft::new("field_1", Operator::NotEmpty, ActionKind::Show, "field_2");
        model.save_logic_rule(draft, None).unwrap();
        model.delete_field("field_2").unwrap();
        assert!(model.logic_rules.is_empty());
        assert!(model.dangling_rules().is_empty());
    }
}

#[cfg(test)]
mod section_tests {
    use super::*;

    #[test]
    fn test_saved_model_reloads() {
        let mut model = complete_model();
        model
            .apply_section("styleInfo", json!({"primaryColor": "#1890ff"}))
            .unwrap();
        let json = model.to_json_pretty();
        let reloaded: FormModel = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded.fields, model.fields);
        assert_eq!(reloaded.section("styleInfo"), model.section("styleInfo"));
    }

    #[test]
    fn test_publish_settings_are_checked_when_published() {
        let mut model = complete_model();
        model
            .apply_section(
                "publishSettings",
                json!({
                    "formStatus": "published",
                    "validityType": "range",
                    "startTime": "2024-05-02T09:00",
                    "endTime": "2024-05-01T09:00"
                }),
            )
            .unwrap();
        assert_eq!(
            model.publish_settings.check(),
            Err("start time must be earlier than end time".to_string())
        );
    }
}
