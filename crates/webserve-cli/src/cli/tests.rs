#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_build_defaults_are_unset() {
        let cli = Cli::try_parse_from(["webserve", "build"]).unwrap();
        match cli.command {
            Command::Build(args) => {
                assert_eq!(args.options.entry, None);
                assert!(args.options.envs.is_empty());
                assert!(!args.options.minify);
                assert!(args.envs_json.is_none());
            }
            _ => panic!("Expected build command"),
        }
    }

    #[test]
    fn test_build_options() {
        let cli = Cli::try_parse_from([
            "webserve",
            "build",
            "--entry",
            "index.tsx",
            "--env",
            "ENVIRONMENT",
            "--env",
            "API_URL",
            "--minify",
            "--externals",
            "react,react-dom",
            "--inline",
            "--plugins",
            "remote-imports",
            "--out",
            "dist",
        ])
        .unwrap();

        let Command::Build(args) = cli.command else {
            panic!("Expected build command");
        };
        let options = args.options;
        assert_eq!(options.entry.as_deref(), Some("index.tsx"));
        assert_eq!(options.envs, vec!["ENVIRONMENT", "API_URL"]);
        assert!(options.minify);
        assert_eq!(options.externals, vec!["react", "react-dom"]);
        assert!(options.inline);
        assert_eq!(options.plugins, vec!["remote-imports"]);
        assert_eq!(options.out, Some(PathBuf::from("dist")));
    }

    #[test]
    fn test_serve_port_and_no_open() {
        let cli = Cli::try_parse_from(["webserve", "serve", "--port", "3000", "--no-open"]).unwrap();
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.port, Some(3000));
                assert!(args.no_open);
            }
            _ => panic!("Expected serve command"),
        }
    }

    #[test]
    fn test_hidden_flags_parse() {
        let cli = Cli::try_parse_from([
            "webserve",
            "build",
            "--envs-json",
            r#"{"ENVIRONMENT":"DEVELOPMENT"}"#,
            "--signal-url",
            "http://localhost:8080/_bundler",
        ])
        .unwrap();

        let Command::Build(args) = cli.command else {
            panic!("Expected build command");
        };
        assert!(args.envs_json.is_some());
        assert_eq!(
            args.signal_url.as_deref(),
            Some("http://localhost:8080/_bundler")
        );
    }

    #[test]
    fn test_watch_is_accepted() {
        let cli = Cli::try_parse_from(["webserve", "watch", "--entry", "main.ts"]).unwrap();
        assert!(matches!(cli.command, Command::Watch(_)));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["webserve", "-v", "-q", "build"]).is_err());
    }
}
