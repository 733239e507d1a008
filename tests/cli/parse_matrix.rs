use backdrop::constraint::{Constraint, Viewport};
use backdrop::tooling::{Cli, Commands};
use clap::Parser;

#[test]
fn resolve_accepts_viewport_or_constraint() {
    let cli = Cli::try_parse_from(["backdrop", "resolve", "--viewport", "1280x720"]).unwrap();
    match cli.command {
        Commands::Resolve {
            viewport,
            constraint,
            format,
            ..
        } => {
            assert_eq!(viewport, Some(Viewport::new(1280, 720)));
            assert_eq!(constraint, None);
            assert_eq!(format, "text");
        }
        _ => panic!("expected resolve"),
    }

    let cli = Cli::try_parse_from([
        "backdrop",
        "resolve",
        "--constraint",
        "portrait/736",
        "--image",
        "lake.jpg",
        "--format",
        "json",
    ])
    .unwrap();
    match cli.command {
        Commands::Resolve {
            constraint, image, ..
        } => {
            assert_eq!(constraint, Some(Constraint::portrait(736)));
            assert_eq!(image.as_deref(), Some("lake.jpg"));
        }
        _ => panic!("expected resolve"),
    }
}

#[test]
fn resolve_rejects_bad_or_missing_targets() {
    let invalid: &[&[&str]] = &[
        &["backdrop", "resolve"],
        &["backdrop", "resolve", "--viewport", "wide"],
        &["backdrop", "resolve", "--constraint", "diagonal/480"],
        &[
            "backdrop",
            "resolve",
            "--viewport",
            "800x600",
            "--constraint",
            "landscape/980",
        ],
    ];
    for args in invalid {
        assert!(
            Cli::try_parse_from(args.iter().copied()).is_err(),
            "{:?} should not parse",
            args
        );
    }
}

#[test]
fn simulate_collects_viewports_in_order() {
    let cli = Cli::try_parse_from([
        "backdrop",
        "simulate",
        "--viewport",
        "375x667",
        "--viewport",
        "1920x1080",
        "--concurrent",
    ])
    .unwrap();
    match cli.command {
        Commands::Simulate {
            viewports,
            concurrent,
            ..
        } => {
            assert_eq!(
                viewports,
                vec![Viewport::new(375, 667), Viewport::new(1920, 1080)]
            );
            assert!(concurrent);
        }
        _ => panic!("expected simulate"),
    }

    assert!(Cli::try_parse_from(["backdrop", "simulate"]).is_err());
}

#[test]
fn global_flags_are_optional() {
    let cli = Cli::try_parse_from([
        "backdrop",
        "--config",
        "/tmp/backdrop.toml",
        "--log-level",
        "debug",
        "breakpoints",
    ])
    .unwrap();
    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("/tmp/backdrop.toml"))
    );
    assert_eq!(cli.log_level.as_deref(), Some("debug"));
    assert!(matches!(cli.command, Commands::Breakpoints { .. }));

    let cli = Cli::try_parse_from(["backdrop", "config"]).unwrap();
    assert!(cli.config.is_none());
    assert!(matches!(cli.command, Commands::Config));
}
