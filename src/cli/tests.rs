//! Unit tests for CLI commands

use crate::cli::{resolve_options, Cli, Commands};
use crate::runtime_config::ServerOptions;
use clap::Parser;

#[test]
fn test_serve_command_with_flags() {
    let cli = Cli::try_parse_from([
        "consume",
        "serve",
        "--addr",
        "127.0.0.1:9000",
        "--secure-headers",
        "--stack-size",
        "0x10000",
    ])
    .unwrap();

    match cli.command {
        Commands::Serve {
            addr,
            secure_headers,
            log_requests,
            stack_size,
        } => {
            assert_eq!(addr.as_deref(), Some("127.0.0.1:9000"));
            assert!(secure_headers);
            assert!(!log_requests);
            assert_eq!(stack_size.as_deref(), Some("0x10000"));
        }
        other => panic!("Expected Serve command, got {other:?}"),
    }
}

#[test]
fn test_routes_command_exists() {
    let cli = Cli::try_parse_from(["consume", "routes"]).unwrap();
    assert!(matches!(cli.command, Commands::Routes));
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["consume", "generate"]).is_err());
}

#[test]
fn test_flags_override_environment() {
    let env = ServerOptions {
        addr: "0.0.0.0:4000".into(),
        log_requests: true,
        ..Default::default()
    };
    let options = resolve_options(env, Some("127.0.0.1:1"), true, false, Some("4096")).unwrap();
    assert_eq!(options.addr, "127.0.0.1:1");
    assert!(options.use_secure_headers);
    // flags only switch features on
    assert!(options.log_requests);
    assert_eq!(options.stack_size, 4096);
}

#[test]
fn test_bad_stack_size_flag() {
    assert!(resolve_options(ServerOptions::default(), None, false, false, Some("huge")).is_err());
}
