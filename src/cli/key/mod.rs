//! Key command - derives the cache key for an operation call

use clap::Args;

use crate::config::AppConfig;
use crate::domain::cache::{CacheKey, KeyArg, KeyBuilder, OperationIdentity};
use crate::domain::predicate::{CompositeKeying, Predicate};
use crate::domain::proxy::validate_key_segment;

/// Arguments for the key command
#[derive(Args, Clone, Debug)]
pub struct KeyArgs {
    /// Owner type name
    #[arg(long)]
    pub owner: String,

    /// Operation name
    #[arg(long)]
    pub operation: String,

    /// Scalar argument, repeatable, in call order
    #[arg(long = "arg", value_name = "VALUE")]
    pub args: Vec<String>,

    /// Filter predicate as JSON, appended after the scalar arguments
    #[arg(long, value_name = "JSON")]
    pub predicate: Option<String>,

    /// Composite keying mode (overrides config)
    #[arg(long)]
    pub keying: Option<CompositeKeying>,
}

/// Run the key command
pub fn run(args: KeyArgs, config: &AppConfig) -> anyhow::Result<()> {
    let keying = args.keying.unwrap_or(config.policy.composite_keying);
    let key = derive_key(&args, keying)?;

    tracing::debug!(owner = %args.owner, operation = %args.operation, %keying, "Derived key");
    println!("{}", key);

    Ok(())
}

fn derive_key(args: &KeyArgs, keying: CompositeKeying) -> anyhow::Result<CacheKey> {
    validate_key_segment("Owner", &args.owner)?;
    validate_key_segment("Operation", &args.operation)?;

    let predicate = args
        .predicate
        .as_deref()
        .map(|json| serde_json::from_str::<Predicate>(json))
        .transpose()?;

    let mut key_args: Vec<KeyArg<'_>> = args.args.iter().map(KeyArg::from).collect();
    if let Some(predicate) = &predicate {
        key_args.push(KeyArg::predicate(predicate));
    }

    let identity = OperationIdentity::new(&args.owner, &args.operation);
    Ok(KeyBuilder::new(keying).build(&identity, &key_args))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_args(args: &[&str], predicate: Option<&str>) -> KeyArgs {
        KeyArgs {
            owner: "CustomerRepository".to_string(),
            operation: "filter".to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            predicate: predicate.map(str::to_string),
            keying: None,
        }
    }

    #[test]
    fn test_scalar_arguments() {
        let key = derive_key(&key_args(&["Lisbon", "10"], None), CompositeKeying::Preserve)
            .unwrap();
        assert_eq!(key.as_str(), "repo:CustomerRepository:filter:Lisbon_10");
    }

    #[test]
    fn test_predicate_json() {
        let json = r#"{"compare": {"field": "City", "op": "equal", "value": "Lisbon"}}"#;
        let key = derive_key(&key_args(&[], Some(json)), CompositeKeying::Preserve).unwrap();
        assert_eq!(key.as_str(), "repo:CustomerRepository:filter:expr:City:Equal:Lisbon");
    }

    #[test]
    fn test_keying_changes_composite_keys() {
        let json = r#"{"composite": {"connector": "or", "operands": [
            {"compare": {"field": "City", "op": "equal", "value": "Lisbon"}},
            {"in": {"field": "Id", "values": [1, 2]}}
        ]}}"#;
        let args = key_args(&[], Some(json));

        let preserved = derive_key(&args, CompositeKeying::Preserve).unwrap();
        let flattened = derive_key(&args, CompositeKeying::Flatten).unwrap();

        assert_eq!(
            flattened.as_str(),
            "repo:CustomerRepository:filter:expr:City:Equal:Lisbon:Id:In:[1,2]"
        );
        assert_ne!(preserved, flattened);
    }

    #[test]
    fn test_invalid_predicate_json() {
        let result = derive_key(&key_args(&[], Some("{not json")), CompositeKeying::Preserve);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_owner() {
        let mut args = key_args(&["x"], None);
        args.owner = "bad:owner".to_string();

        assert!(derive_key(&args, CompositeKeying::Preserve).is_err());
    }
}
