//! # Role Synthesis
//!
//! Turns the aggregated resources of one module into its `manage` and `use`
//! cluster roles.
//!
//! ```text
//! cluster resources    ─→ manage:view, manage:edit   (always emitted)
//!   + own moduleconfig    (every module except the owner)
//! namespaced resources ─→ use:view, use:edit         (emitted as a pair, or not at all)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::resources::AggregatedResources;
use crate::roles::{Role, RoleKind, RoleName, RoleTier};
use crate::rules::Rule;
use crate::verbs::{VerbClass, SELF_CONFIG_EDIT_VERBS};

/// Resource holding per-module configuration objects.
pub const MODULE_CONFIG_RESOURCE: &str = "moduleconfigs";

/// Label carrying the platform that generated the role.
pub const LABEL_HERITAGE: &str = "heritage";
/// Label carrying the module name.
pub const LABEL_MODULE: &str = "module";
/// Label carrying the role kind.
pub const LABEL_KIND: &str = "rbac.deckhouse.io/kind";
/// Label marking module-level manage roles.
pub const LABEL_LEVEL: &str = "rbac.deckhouse.io/level";
/// Label carrying the module namespace on manage roles.
pub const LABEL_NAMESPACE: &str = "rbac.deckhouse.io/namespace";
/// Aggregation label of every use role.
pub const LABEL_USE_AGGREGATE: &str = "rbac.deckhouse.io/aggregate-to-kubernetes-as";

/// Value of [`LABEL_LEVEL`] on module roles.
pub const LEVEL_MODULE: &str = "module";

/// Aggregation label key of manage roles for a subsystem.
pub fn subsystem_aggregate_label(subsystem: &str) -> String {
    format!("rbac.deckhouse.io/aggregate-to-{}-as", subsystem)
}

/// Platform constants the naming and labelling scheme depends on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleScheme {
    /// Prefix of every role name.
    pub prefix: String,
    /// Value of the `heritage` label.
    pub heritage: String,
    /// Group owning module configurations.
    pub config_group: String,
    /// Module that already has unrestricted access to module configurations.
    pub owner_module: String,
}

impl Default for RoleScheme {
    fn default() -> Self {
        Self {
            prefix: "d8".to_string(),
            heritage: "deckhouse".to_string(),
            config_group: "deckhouse.io".to_string(),
            owner_module: "deckhouse".to_string(),
        }
    }
}

/// The module a set of roles is synthesized for.
#[derive(Debug, Clone, Copy)]
pub struct RoleSubject<'a> {
    /// Module name.
    pub module: &'a str,
    /// Subsystems the module belongs to.
    pub subsystems: &'a [String],
    /// Namespace associated with the module, if any.
    pub namespace: Option<&'a str>,
}

/// Roles synthesized for one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRoles {
    /// `manage` roles: view then edit. Always two.
    pub manage: Vec<Role>,
    /// `use` roles: view then edit, or none.
    pub use_roles: Vec<Role>,
}

impl ModuleRoles {
    /// All roles, manage first.
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.manage.iter().chain(self.use_roles.iter())
    }

    /// Number of roles.
    pub fn len(&self) -> usize {
        self.manage.len() + self.use_roles.len()
    }

    /// Check if no role was synthesized.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
struct ClassRules {
    view: Vec<Rule>,
    edit: Vec<Rule>,
}

impl ClassRules {
    fn from_groups(groups: &BTreeMap<String, Vec<String>>) -> Self {
        let mut rules = Self::default();
        for (group, resources) in groups {
            rules.view.push(Rule::for_class(group.as_str(), resources.clone(), VerbClass::View));
            rules.edit.push(Rule::for_class(group.as_str(), resources.clone(), VerbClass::Edit));
        }
        rules
    }

    fn take(&mut self, class: VerbClass) -> Vec<Rule> {
        match class {
            VerbClass::View => std::mem::take(&mut self.view),
            VerbClass::Edit => std::mem::take(&mut self.edit),
        }
    }
}

impl RoleScheme {
    /// Synthesize the roles of `subject` from its aggregated resources.
    ///
    /// Rules follow the lexicographic order of API groups, so the output is
    /// fully determined by the inputs.
    pub fn synthesize(&self, subject: &RoleSubject<'_>, resources: &AggregatedResources) -> ModuleRoles {
        let mut manage = ClassRules::from_groups(&resources.cluster);
        let mut using = ClassRules::from_groups(&resources.namespaced);

        if subject.module != self.owner_module {
            manage.view.push(self.self_config_rule(subject.module, VerbClass::View));
            manage.edit.push(self.self_config_rule(subject.module, VerbClass::Edit));
        }

        let manage_roles = VerbClass::all()
            .into_iter()
            .map(|class| self.build_role(subject, RoleKind::Manage, class, manage.take(class)))
            .collect();

        let mut use_roles = Vec::new();
        if !using.view.is_empty() && !using.edit.is_empty() {
            for class in VerbClass::all() {
                use_roles.push(self.build_role(subject, RoleKind::Use, class, using.take(class)));
            }
        }

        ModuleRoles {
            manage: manage_roles,
            use_roles,
        }
    }

    /// Rule granting a module access to its own module configuration.
    fn self_config_rule(&self, module: &str, class: VerbClass) -> Rule {
        let resources = vec![MODULE_CONFIG_RESOURCE.to_string()];
        let rule = match class {
            VerbClass::View => Rule::for_class(self.config_group.as_str(), resources, class),
            VerbClass::Edit => Rule::new(self.config_group.as_str(), resources, &SELF_CONFIG_EDIT_VERBS),
        };
        rule.with_resource_names([module])
    }

    fn build_role(
        &self,
        subject: &RoleSubject<'_>,
        kind: RoleKind,
        class: VerbClass,
        rules: Vec<Rule>,
    ) -> Role {
        let name = RoleName::new(self.prefix.as_str(), kind, subject.module, class);
        Role::new(&name, self.labels(subject, kind, RoleTier::from(class)), rules)
    }

    /// Labels of a role of the given kind and tier.
    pub fn labels(&self, subject: &RoleSubject<'_>, kind: RoleKind, tier: RoleTier) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_HERITAGE.to_string(), self.heritage.clone());
        labels.insert(LABEL_MODULE.to_string(), subject.module.to_string());
        labels.insert(LABEL_KIND.to_string(), kind.as_str().to_string());

        match kind {
            RoleKind::Use => {
                labels.insert(LABEL_USE_AGGREGATE.to_string(), tier.as_str().to_string());
            }
            RoleKind::Manage => {
                labels.insert(LABEL_LEVEL.to_string(), LEVEL_MODULE.to_string());
                for subsystem in subject.subsystems {
                    labels.insert(subsystem_aggregate_label(subsystem), tier.as_str().to_string());
                }
                if let Some(namespace) = subject.namespace {
                    labels.insert(LABEL_NAMESPACE.to_string(), namespace.to_string());
                }
            }
        }

        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{ResourceRecord, Scope};
    use crate::verbs::{Verb, EDIT_VERBS, VIEW_VERBS};
    use proptest::prelude::*;

    fn subject<'a>(module: &'a str, subsystems: &'a [String]) -> RoleSubject<'a> {
        RoleSubject {
            module,
            subsystems,
            namespace: Some("d8-alpha"),
        }
    }

    fn alpha_resources() -> AggregatedResources {
        AggregatedResources::from_records(vec![
            ResourceRecord::new("alpha.io", "widgets", Scope::Cluster),
            ResourceRecord::new("alpha.io", "gadgets", Scope::Namespaced),
        ])
    }

    #[test]
    fn test_alpha_scenario() {
        let subsystems = vec!["observability".to_string()];
        let roles = RoleScheme::default().synthesize(&subject("alpha", &subsystems), &alpha_resources());

        assert_eq!(roles.manage.len(), 2);
        assert_eq!(roles.use_roles.len(), 2);

        let manage_view = &roles.manage[0];
        assert_eq!(manage_view.name(), "d8:manage:permission:module:alpha:view");
        assert_eq!(
            manage_view.rules[0],
            Rule::new("alpha.io", vec!["widgets".to_string()], &VIEW_VERBS)
        );

        let manage_edit = &roles.manage[1];
        assert_eq!(manage_edit.name(), "d8:manage:permission:module:alpha:edit");
        assert_eq!(
            manage_edit.rules[0],
            Rule::new("alpha.io", vec!["widgets".to_string()], &EDIT_VERBS)
        );
        assert_eq!(
            manage_edit.rules[1],
            Rule::new("deckhouse.io", vec!["moduleconfigs".to_string()], &SELF_CONFIG_EDIT_VERBS)
                .with_resource_names(["alpha"])
        );

        assert_eq!(roles.use_roles[0].name(), "d8:use:capability:module:alpha:view");
        assert_eq!(roles.use_roles[0].rules, vec![Rule::new("alpha.io", vec!["gadgets".to_string()], &VIEW_VERBS)]);
        assert_eq!(roles.use_roles[1].name(), "d8:use:capability:module:alpha:edit");
        assert_eq!(roles.use_roles[1].rules, vec![Rule::new("alpha.io", vec!["gadgets".to_string()], &EDIT_VERBS)]);
    }

    #[test]
    fn test_self_config_carve_out_excludes_deletecollection() {
        let roles = RoleScheme::default().synthesize(&subject("alpha", &[]), &AggregatedResources::default());

        let carve_outs: Vec<_> = roles.manage[1]
            .rules
            .iter()
            .filter(|r| r.covers(MODULE_CONFIG_RESOURCE))
            .collect();
        assert_eq!(carve_outs.len(), 1);
        assert_eq!(carve_outs[0].resource_names, vec!["alpha"]);
        assert!(!carve_outs[0].grants(Verb::DeleteCollection));
        assert!(carve_outs[0].grants(Verb::Delete));

        let view = &roles.manage[0].rules;
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].verbs, VIEW_VERBS.to_vec());
    }

    #[test]
    fn test_owner_module_has_no_carve_out() {
        let roles = RoleScheme::default().synthesize(&subject("deckhouse", &[]), &AggregatedResources::default());

        assert_eq!(roles.manage.len(), 2);
        assert!(roles.manage.iter().all(|r| r.rules.is_empty()));
        assert!(roles.use_roles.is_empty());
    }

    #[test]
    fn test_no_namespaced_resources_means_no_use_roles() {
        let resources = AggregatedResources::from_records(vec![ResourceRecord::new(
            "alpha.io",
            "widgets",
            Scope::Cluster,
        )]);
        let roles = RoleScheme::default().synthesize(&subject("alpha", &[]), &resources);

        assert_eq!(roles.manage.len(), 2);
        assert!(roles.use_roles.is_empty());
        assert_eq!(roles.len(), 2);
    }

    #[test]
    fn test_manage_labels() {
        let subsystems = vec!["observability".to_string(), "network".to_string()];
        let roles = RoleScheme::default().synthesize(&subject("alpha", &subsystems), &alpha_resources());

        let view = &roles.manage[0];
        assert_eq!(view.label(LABEL_HERITAGE), Some("deckhouse"));
        assert_eq!(view.label(LABEL_MODULE), Some("alpha"));
        assert_eq!(view.label(LABEL_KIND), Some("manage"));
        assert_eq!(view.label(LABEL_LEVEL), Some("module"));
        assert_eq!(view.label("rbac.deckhouse.io/aggregate-to-observability-as"), Some("viewer"));
        assert_eq!(view.label("rbac.deckhouse.io/aggregate-to-network-as"), Some("viewer"));
        assert_eq!(view.label(LABEL_NAMESPACE), Some("d8-alpha"));
        assert_eq!(view.label(LABEL_USE_AGGREGATE), None);

        let edit = &roles.manage[1];
        assert_eq!(edit.label("rbac.deckhouse.io/aggregate-to-network-as"), Some("manager"));
    }

    #[test]
    fn test_manage_labels_without_namespace() {
        let subject = RoleSubject {
            module: "alpha",
            subsystems: &[],
            namespace: None,
        };
        let roles = RoleScheme::default().synthesize(&subject, &AggregatedResources::default());
        assert_eq!(roles.manage[0].label(LABEL_NAMESPACE), None);
    }

    #[test]
    fn test_use_labels() {
        let subsystems = vec!["observability".to_string()];
        let roles = RoleScheme::default().synthesize(&subject("alpha", &subsystems), &alpha_resources());

        let view = &roles.use_roles[0];
        assert_eq!(view.metadata.labels.len(), 4);
        assert_eq!(view.label(LABEL_KIND), Some("use"));
        assert_eq!(view.label(LABEL_USE_AGGREGATE), Some("viewer"));
        assert_eq!(view.label(LABEL_LEVEL), None);
        assert_eq!(view.label(LABEL_NAMESPACE), None);
        assert_eq!(roles.use_roles[1].label(LABEL_USE_AGGREGATE), Some("manager"));
    }

    #[test]
    fn test_rules_follow_group_order() {
        let resources = AggregatedResources::from_records(vec![
            ResourceRecord::new("zeta.io", "zebras", Scope::Cluster),
            ResourceRecord::new("alpha.io", "widgets", Scope::Cluster),
        ]);
        let roles = RoleScheme::default().synthesize(&subject("alpha", &[]), &resources);

        let groups: Vec<_> = roles.manage[0].rules.iter().map(|r| r.api_groups[0].as_str()).collect();
        assert_eq!(groups, vec!["alpha.io", "zeta.io", "deckhouse.io"]);
    }

    #[test]
    fn test_custom_scheme() {
        let scheme = RoleScheme {
            prefix: "acme".to_string(),
            heritage: "acme".to_string(),
            config_group: "acme.io".to_string(),
            owner_module: "core".to_string(),
        };
        let roles = scheme.synthesize(&subject("alpha", &[]), &AggregatedResources::default());
        assert_eq!(roles.manage[0].name(), "acme:manage:permission:module:alpha:view");
        assert_eq!(roles.manage[0].rules[0].api_groups, vec!["acme.io"]);
    }

    proptest! {
        #[test]
        fn prop_rules_ignore_discovery_order(
            (recs, shuffled) in prop::collection::vec(
                (
                    prop::sample::select(vec!["a.io", "b.io", "c.io"]),
                    "[a-c]{1,2}s",
                    prop::bool::ANY,
                ),
                0..16,
            )
            .prop_map(|raw| {
                raw.into_iter()
                    .map(|(g, p, c)| ResourceRecord::new(g, p, if c { Scope::Cluster } else { Scope::Namespaced }))
                    .collect::<Vec<_>>()
            })
            .prop_flat_map(|recs| (Just(recs.clone()), Just(recs).prop_shuffle()))
        ) {
            let scheme = RoleScheme::default();
            let a = scheme.synthesize(&subject("alpha", &[]), &AggregatedResources::from_records(recs));
            let b = scheme.synthesize(&subject("alpha", &[]), &AggregatedResources::from_records(shuffled));
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.use_roles.is_empty(), a.use_roles.len() != 2);
        }
    }
}
