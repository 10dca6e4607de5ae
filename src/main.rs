//! hookcheck CLI - inspect encodings and dry-run interception checks
//!
//! Commands:
//!   hookcheck parse <encoding>   - Decode a type-encoding string
//!   hookcheck check --fixture .. - Check an interceptor against a fixture runtime

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hookcheck::introspect::{Registry, RegistryCandidate, RegistryObject};
use hookcheck::{
    parse_signature, Checker, DispatchKey, HookTarget, Mode, Policy, Signature, SignatureKind,
    TypeDescriptor,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hookcheck")]
#[command(about = "Calling-convention checks for method interception", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a type-encoding string and show its slots
    Parse {
        /// Encoding, e.g. `q32@0:8q16q24`
        encoding: String,

        /// Treat the encoding as a block rather than a method
        #[arg(long)]
        closure: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check an interceptor against a member of a fixture runtime
    Check {
        /// Registry JSON describing the runtime
        #[arg(long)]
        fixture: PathBuf,

        /// Target type name
        #[arg(long = "type")]
        type_name: String,

        /// Member key (selector)
        #[arg(long)]
        key: String,

        /// before, after or instead
        #[arg(long)]
        mode: Mode,

        /// Block encoding of the interceptor; omit to pass a non-block value
        #[arg(long)]
        interceptor: Option<String>,

        /// Target a single instance instead of the whole type
        #[arg(long)]
        instance: bool,

        /// Policy JSON overriding reserved and lifecycle keys
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            encoding,
            closure,
            json,
        } => parse_command(&encoding, closure, json),
        Commands::Check {
            fixture,
            type_name,
            key,
            mode,
            interceptor,
            instance,
            policy,
            json,
        } => {
            let target = if instance {
                HookTarget::Instance(RegistryObject::Instance(type_name))
            } else {
                HookTarget::Type(type_name)
            };
            let candidate = match interceptor {
                Some(encoding) => RegistryCandidate::Closure(encoding),
                None => RegistryCandidate::Opaque,
            };
            check_command(
                &fixture,
                policy.as_deref(),
                &target,
                &DispatchKey::from(key),
                mode,
                &candidate,
                json,
            )
        }
    }
}

fn parse_command(encoding: &str, closure: bool, json: bool) -> anyhow::Result<ExitCode> {
    let kind = if closure {
        SignatureKind::Closure
    } else {
        SignatureKind::Method
    };
    let signature = parse_signature(kind, encoding)
        .map_err(|e| anyhow::anyhow!("Failed to parse '{}': {}", encoding, e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&signature)?);
    } else {
        print_signature(&signature, "");
    }
    Ok(ExitCode::SUCCESS)
}

fn print_signature(signature: &Signature, indent: &str) {
    println!("{}kind: {:?}", indent, signature.kind());
    println!("{}returns: {}", indent, signature.return_type());
    let implicit = signature.kind().implicit_slots();
    for (slot, ty) in signature.argument_types().iter().enumerate() {
        let marker = if slot < implicit { " (implicit)" } else { "" };
        println!("{}arg {}: {}{}", indent, slot, ty, marker);
        print_nested(ty, indent);
    }
}

fn print_nested(ty: &TypeDescriptor, indent: &str) {
    if let Some(nested) = ty.nested_signature() {
        print_signature(nested, &format!("{indent}    "));
    }
}

fn check_command(
    fixture: &Path,
    policy: Option<&Path>,
    target: &HookTarget<RegistryObject>,
    key: &DispatchKey,
    mode: Mode,
    candidate: &RegistryCandidate,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let fixture_json = std::fs::read_to_string(fixture)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", fixture.display(), e))?;
    let registry = Registry::from_json(&fixture_json)?;

    let policy = match policy {
        Some(path) => {
            let policy_json = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
            Policy::from_json(&policy_json)
                .map_err(|e| anyhow::anyhow!("Invalid policy {}: {}", path.display(), e))?
        }
        None => Policy::default(),
    };

    let checker = Checker::with_policy(registry, policy);
    let result = checker.check(target, key, mode, candidate);

    if json {
        let output = match &result {
            Ok(()) => serde_json::json!({ "accepted": true }),
            Err(diagnostic) => serde_json::json!({
                "accepted": false,
                "internal": diagnostic.is_internal(),
                "message": diagnostic.to_string(),
                "diagnostic": diagnostic,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match &result {
            Ok(()) => println!("accepted"),
            Err(diagnostic) => println!("rejected: {}", diagnostic),
        }
    }

    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
