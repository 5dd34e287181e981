use crate::domain::model::{
    PatchStatus, ProvisioningOutcome, RoleDefinition, RoleReport, SkipReason, TemplatePatch,
};
use crate::domain::ports::ModelRuntime;
use crate::utils::error::Result;
use regex::Regex;
use std::collections::HashSet;
use std::fs;

/// Derives and registers one named model per role from Modelfile templates.
/// Roles are processed in the given order; one role's failure never stops
/// the rest.
pub struct RoleRegistrar<'a, M: ModelRuntime> {
    runtime: &'a M,
    patch: Option<&'a TemplatePatch>,
}

impl<'a, M: ModelRuntime> RoleRegistrar<'a, M> {
    pub fn new(runtime: &'a M, patch: Option<&'a TemplatePatch>) -> Self {
        Self { runtime, patch }
    }

    pub async fn register_roles(&self, roles: &[RoleDefinition]) -> Vec<RoleReport> {
        // Consulted to distinguish Installed from AlreadyPresent; the create
        // is still issued either way so re-runs refresh the model.
        let existing: HashSet<String> = match self.runtime.list().await {
            Ok(names) => names.into_iter().collect(),
            Err(e) => {
                tracing::warn!("could not list existing models: {}", e);
                HashSet::new()
            }
        };

        let mut reports = Vec::with_capacity(roles.len());
        for role in roles {
            let report = self.register_one(role, &existing).await;
            match &report.outcome {
                o if o.is_success() => println!("✅ {} → {}: {}", role.role_id, role.model_name, o),
                o => println!("❌ {} → {}: {}", role.role_id, role.model_name, o),
            }
            reports.push(report);
        }
        reports
    }

    async fn register_one(&self, role: &RoleDefinition, existing: &HashSet<String>) -> RoleReport {
        let mut report = RoleReport {
            role_id: role.role_id.clone(),
            model_name: role.model_name.clone(),
            outcome: ProvisioningOutcome::Skipped(SkipReason::TemplateNotFound),
            patch: PatchStatus::NotRequested,
        };

        if !role.template.exists() {
            tracing::warn!(
                "template not found for role {}: {}",
                role.role_id,
                role.template.display()
            );
            return report;
        }
        let content = match fs::read_to_string(&role.template) {
            Ok(c) => c,
            Err(e) => {
                report.outcome = ProvisioningOutcome::Failed(format!(
                    "cannot read template {}: {}",
                    role.template.display(),
                    e
                ));
                return report;
            }
        };

        // Substitution runs on a working copy only; the canonical template
        // on disk is never modified.
        let (content, patch_status) = self.apply_patch(content);
        report.patch = patch_status;

        if let Err(e) = self.runtime.pull(&role.base_model).await {
            report.outcome =
                ProvisioningOutcome::Failed(format!("pull {}: {}", role.base_model, e));
            return report;
        }

        report.outcome = match self.runtime.create(&role.model_name, &content).await {
            Ok(()) if existing.contains(&role.model_name) => ProvisioningOutcome::AlreadyPresent,
            Ok(()) => ProvisioningOutcome::Installed,
            Err(e) => ProvisioningOutcome::Failed(format!("create: {}", e)),
        };
        report
    }

    fn apply_patch(&self, content: String) -> (String, PatchStatus) {
        let Some(patch) = self.patch else {
            return (content, PatchStatus::NotRequested);
        };
        match Regex::new(&patch.pattern) {
            Ok(re) if re.is_match(&content) => {
                let patched = re.replace_all(&content, patch.replacement.as_str()).into_owned();
                (patched, PatchStatus::Applied)
            }
            Ok(_) => (
                content,
                PatchStatus::FellBack("pattern matched nothing".to_string()),
            ),
            Err(e) => (content, PatchStatus::FellBack(format!("invalid pattern: {}", e))),
        }
    }

    /// One listing query after the batch, for operator confirmation only.
    pub async fn consolidated_listing(&self) -> Result<Vec<String>> {
        self.runtime.list().await
    }
}
