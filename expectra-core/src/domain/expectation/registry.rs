// expectra-core/src/domain/expectation/registry.rs

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::error::DomainError;
use crate::domain::expectation::Expectation;
use crate::domain::expectation::configuration::ExpectationConfiguration;
use crate::domain::expectation::examples::ExpectationExample;
use crate::domain::expectation::library::LibraryMetadata;
use crate::domain::expectation::unique_with_condition::UniqueWithCondition;

/// Closed set of expectation kinds this crate knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ExpectationKind {
    QueriedColumnToBeUniqueWithCondition,
}

impl ExpectationKind {
    pub const ALL: [ExpectationKind; 1] = [Self::QueriedColumnToBeUniqueWithCondition];

    pub fn name(&self) -> &'static str {
        match self {
            Self::QueriedColumnToBeUniqueWithCondition => UniqueWithCondition::EXPECTATION_TYPE,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::QueriedColumnToBeUniqueWithCondition => UniqueWithCondition::DESCRIPTION,
        }
    }

    pub fn metric_dependencies(&self) -> &'static [&'static str] {
        match self {
            Self::QueriedColumnToBeUniqueWithCondition => UniqueWithCondition::METRIC_DEPENDENCIES,
        }
    }

    pub fn success_keys(&self) -> &'static [&'static str] {
        match self {
            Self::QueriedColumnToBeUniqueWithCondition => UniqueWithCondition::SUCCESS_KEYS,
        }
    }

    pub fn domain_keys(&self) -> &'static [&'static str] {
        match self {
            Self::QueriedColumnToBeUniqueWithCondition => UniqueWithCondition::DOMAIN_KEYS,
        }
    }

    pub fn library_metadata(&self) -> LibraryMetadata {
        match self {
            Self::QueriedColumnToBeUniqueWithCondition => UniqueWithCondition::library_metadata(),
        }
    }

    pub fn examples(&self) -> Vec<ExpectationExample> {
        match self {
            Self::QueriedColumnToBeUniqueWithCondition => UniqueWithCondition::examples(),
        }
    }
}

/// Explicit name -> kind table. Nothing is discovered implicitly.
#[derive(Debug, Clone)]
pub struct ExpectationRegistry {
    entries: BTreeMap<&'static str, ExpectationKind>,
}

impl Default for ExpectationRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ExpectationRegistry {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registry holding every kind in `ExpectationKind::ALL`.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for kind in ExpectationKind::ALL {
            registry.register(kind);
        }
        registry
    }

    pub fn register(&mut self, kind: ExpectationKind) {
        self.entries.insert(kind.name(), kind);
    }

    pub fn lookup(&self, name: &str) -> Result<ExpectationKind, DomainError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| DomainError::UnknownExpectation(name.to_string()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = ExpectationKind> + '_ {
        self.entries.values().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validates the configuration and builds the expectation it declares.
    pub fn build(
        &self,
        config: &ExpectationConfiguration,
    ) -> Result<Box<dyn Expectation>, DomainError> {
        self.lookup(config.expectation_type())?;
        match config {
            ExpectationConfiguration::ExpectQueriedColumnToBeUniqueWithCondition(kwargs) => {
                Ok(Box::new(UniqueWithCondition::try_new(kwargs.clone())?))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::expectation::configuration::UniqueWithConditionKwargs;

    #[test]
    fn test_builtin_registry() {
        let registry = ExpectationRegistry::builtin();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry
                .lookup("expect_queried_column_to_be_unique_with_condition")
                .unwrap(),
            ExpectationKind::QueriedColumnToBeUniqueWithCondition
        );
        assert_eq!(
            registry.lookup("expect_column_values_to_be_unique"),
            Err(DomainError::UnknownExpectation(
                "expect_column_values_to_be_unique".into()
            ))
        );
    }

    #[test]
    fn test_build_requires_registration() {
        let config: ExpectationConfiguration =
            UniqueWithConditionKwargs::new("uuid", "is_open").into();

        let empty = ExpectationRegistry::empty();
        assert!(matches!(
            empty.build(&config),
            Err(DomainError::UnknownExpectation(_))
        ));

        let registry = ExpectationRegistry::builtin();
        let expectation = registry.build(&config).unwrap();
        assert_eq!(
            expectation.kind(),
            ExpectationKind::QueriedColumnToBeUniqueWithCondition
        );
    }

    #[test]
    fn test_kind_metadata() {
        let kind = ExpectationKind::QueriedColumnToBeUniqueWithCondition;
        assert_eq!(kind.metric_dependencies(), &["query.column_pair"]);
        assert_eq!(kind.success_keys(), &["column_A", "column_B", "query"]);
        assert_eq!(
            kind.domain_keys(),
            &["batch_id", "row_condition", "condition_parser"]
        );
        assert!(kind.library_metadata().is_complete());
    }
}
