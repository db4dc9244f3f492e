//! Tests for scene loading, replay, and argument parsing

#[cfg(test)]
mod tests {
    use crate::runner::{self, format_step};
    use crate::scene::Scene;
    use crate::{parse_args, Options};
    use sticky::Transition;

    const HEADERS_SCENE: &str = include_str!("../scenes/headers.toml");

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("sticky-sim")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn bundled_scene_parses() {
        let scene = Scene::from_toml_str(HEADERS_SCENE).unwrap();

        assert_eq!(scene.viewport_height, 600.0);
        assert_eq!(scene.blocks.len(), 7);
        assert_eq!(scene.blocks.iter().filter(|b| b.sticky).count(), 3);
        assert_eq!(scene.blocks[3].config.stuck_class.as_deref(), Some("chapter-pinned"));
        assert_eq!(scene.blocks[5].config.use_default_style, Some(false));
        assert_eq!(scene.scroll.len(), 9);
    }

    #[test]
    fn bundled_scene_replays_stack() {
        let scene = Scene::from_toml_str(HEADERS_SCENE).unwrap();
        let reports = runner::run(&scene).unwrap();

        let active: Vec<Option<&str>> = reports.iter().map(|r| r.active.as_deref()).collect();
        assert_eq!(
            active,
            vec![
                None,
                Some("chapter-1"),
                Some("chapter-1"),
                Some("chapter-2"),
                Some("chapter-2"),
                Some("chapter-3"),
                Some("chapter-2"),
                Some("chapter-1"),
                None,
            ]
        );

        let step = &reports[3];
        assert_eq!(step.transitions.len(), 2);
        assert_eq!(step.transitions[0].element, "chapter-2");
        assert_eq!(step.transitions[0].transition, Transition::Stuck);
        assert_eq!(step.transitions[1].element, "chapter-1");
        assert_eq!(step.transitions[1].transition, Transition::Superseded);
        assert!(reports.last().unwrap().registry.is_empty());
    }

    #[test]
    fn scroll_beyond_document_is_clamped() {
        let toml = r#"
            viewport_height = 500
            scroll = [5000]

            [[block]]
            label = "header"
            height = 50
            sticky = true

            [[block]]
            label = "body"
            height = 1000
        "#;
        let scene = Scene::from_toml_str(toml).unwrap();
        let reports = runner::run(&scene).unwrap();

        assert_eq!(reports[0].requested, 5000.0);
        assert_eq!(reports[0].offset, 550.0);
        assert!(format_step(&reports[0]).contains("(requested 5000)"));
    }

    #[test]
    fn scene_without_sticky_blocks_is_rejected() {
        let toml = r#"
            [[block]]
            label = "plain"
            height = 100
        "#;

        let err = Scene::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("no sticky blocks"));
    }

    #[test]
    fn negative_height_is_rejected() {
        let toml = r#"
            [[block]]
            label = "header"
            height = -1
            sticky = true
        "#;

        assert!(Scene::from_toml_str(toml).is_err());
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(Scene::from_toml_str("this is not valid { toml [").is_err());
    }

    #[test]
    fn step_format_lists_transitions_and_stack() {
        let scene = Scene::from_toml_str(HEADERS_SCENE).unwrap();
        let reports = runner::run(&scene).unwrap();

        let text = format_step(&reports[5]);
        assert!(text.starts_with("step 5: scroll 1180"), "{}", text);
        assert!(text.contains("chapter-3: stuck"), "{}", text);
        assert!(text.contains("chapter-2: superseded"), "{}", text);
        assert!(text.contains("stack: [#0(unstuck) #1(unstuck) #2] active: chapter-3"), "{}", text);
    }

    #[test]
    fn step_report_serializes_to_json() {
        let scene = Scene::from_toml_str(HEADERS_SCENE).unwrap();
        let reports = runner::run(&scene).unwrap();

        let value = serde_json::to_value(&reports[3]).unwrap();
        assert_eq!(value["active"], "chapter-2");
        assert_eq!(value["transitions"][0]["transition"], "stuck");
        assert_eq!(value["registry"][0]["unstuck"], true);
        assert_eq!(value["registry"][1]["id"], 1);
    }

    #[test]
    fn parse_args_scene_and_json() {
        let options = parse_args(&args(&["--json", "scene.toml"])).unwrap().unwrap();
        assert_eq!(
            options,
            Options {
                scene: "scene.toml".into(),
                json: true,
                config: None,
            }
        );
    }

    #[test]
    fn parse_args_config_path() {
        let options = parse_args(&args(&["--config", "sticky.toml", "scene.toml"]))
            .unwrap()
            .unwrap();
        assert_eq!(options.config, Some("sticky.toml".into()));
        assert_eq!(options.scene, std::path::PathBuf::from("scene.toml"));
        assert!(!options.json);

        assert!(parse_args(&args(&["scene.toml", "--config"])).is_err());
    }

    #[test]
    fn parse_args_help() {
        assert!(parse_args(&args(&["--help"])).unwrap().is_none());
    }

    #[test]
    fn parse_args_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["--verbose", "scene.toml"])).is_err());
        assert!(parse_args(&args(&["a.toml", "b.toml"])).is_err());
    }
}
