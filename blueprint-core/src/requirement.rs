//! Markdown requirement-file generation.
//!
//! Requirement files instruct an external coding agent to perform a
//! remediation task; the backend persists them via
//! `POST /api/claude-code/requirement` (or the structure-scan save route).

use blueprint_model::{Context, Project, StructureViolation};
use serde::{Deserialize, Serialize};

use crate::error::{BlueprintError, Result};

/// A generated markdown requirement document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementFile {
    pub file_name: String,
    pub title: String,
    pub markdown: String,
}

fn slug(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Remediation requirement for structure-rule violations.
///
/// An empty violation selection is a validation error surfaced to the user,
/// never a silently empty file.
pub fn structure_remediation(
    project: &Project,
    violations: &[StructureViolation],
) -> Result<RequirementFile> {
    if violations.is_empty() {
        return Err(BlueprintError::Validation(
            "no violations selected for requirement generation".to_string(),
        ));
    }

    let title = format!("Fix structure violations in {}", project.name);
    let mut markdown = String::new();
    markdown.push_str(&format!("# {title}\n\n"));
    markdown.push_str("## Goal\n\n");
    markdown.push_str(&format!(
        "Resolve {} structure violation(s) detected in `{}`.\n\n",
        violations.len(),
        project.path
    ));
    markdown.push_str("## Findings\n\n");
    markdown.push_str("| Rule | File | Detail |\n|---|---|---|\n");
    for violation in violations {
        markdown.push_str(&format!(
            "| {} | `{}` | {} |\n",
            violation.rule, violation.file, violation.detail
        ));
    }
    markdown.push_str("\n## Tasks\n\n");
    for violation in violations {
        markdown.push_str(&format!(
            "- [ ] {}: fix `{}` ({})\n",
            violation.rule, violation.file, violation.detail
        ));
    }

    Ok(RequirementFile {
        file_name: format!("{}-structure-fixes.md", slug(&project.name)),
        title,
        markdown,
    })
}

/// Review requirement summarizing a vision analysis over a context.
pub fn vision_review(
    project: &Project,
    context_name: &str,
    files: usize,
    directories: usize,
    depth: usize,
) -> RequirementFile {
    let title =
        format!("Review vision findings for {} / {context_name}", project.name);
    let markdown = format!(
        "# {title}\n\n## Goal\n\nReview the analyzed slice of `{}`.\n\n\
         ## Summary\n\n- Files: {files}\n- Directories: {directories}\n\
         - Max depth: {depth}\n\n## Tasks\n\n\
         - [ ] Confirm the context `{context_name}` still matches the code it names\n\
         - [ ] File follow-up issues for any stale areas\n",
        project.path
    );
    RequirementFile {
        file_name: format!(
            "{}-{}-vision-review.md",
            slug(&project.name),
            slug(context_name)
        ),
        title,
        markdown,
    }
}

/// Grouping proposal for contexts that belong to no context group.
pub fn context_grouping(
    project: &Project,
    ungrouped: &[Context],
) -> Result<RequirementFile> {
    if ungrouped.is_empty() {
        return Err(BlueprintError::Validation(
            "no ungrouped contexts to organize".to_string(),
        ));
    }
    let title = format!("Organize contexts in {}", project.name);
    let mut markdown = format!(
        "# {title}\n\n## Goal\n\nAssign {} ungrouped context(s) to groups.\n\n\
         ## Contexts\n\n",
        ungrouped.len()
    );
    for context in ungrouped {
        markdown.push_str(&format!(
            "- [ ] `{}` ({} files)\n",
            context.name, context.file_count
        ));
    }
    Ok(RequirementFile {
        file_name: format!("{}-context-grouping.md", slug(&project.name)),
        title,
        markdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_model::{ProjectId, Severity};

    fn project() -> Project {
        Project {
            id: ProjectId::new(),
            name: "Demo App".to_string(),
            path: "/srv/demo-app".to_string(),
            framework: Some("nextjs".to_string()),
        }
    }

    fn violation(file: &str) -> StructureViolation {
        StructureViolation {
            rule: "no-deep-imports".to_string(),
            file: file.to_string(),
            detail: "imports across module boundaries".to_string(),
            severity: Severity::Warning,
        }
    }

    #[test]
    fn empty_violation_selection_is_a_validation_error() {
        let err = structure_remediation(&project(), &[]).unwrap_err();
        assert!(matches!(err, BlueprintError::Validation(_)));
    }

    #[test]
    fn structure_requirement_lists_every_violation() {
        let violations =
            vec![violation("src/a.ts"), violation("src/lib/b.ts")];
        let requirement =
            structure_remediation(&project(), &violations).unwrap();

        assert_eq!(requirement.file_name, "demo-app-structure-fixes.md");
        assert!(requirement.markdown.contains("| no-deep-imports | `src/a.ts`"));
        assert!(requirement.markdown.contains("- [ ] no-deep-imports: fix `src/lib/b.ts`"));
        assert!(requirement.markdown.contains("2 structure violation(s)"));
    }

    #[test]
    fn slugs_collapse_non_alphanumerics() {
        let requirement = vision_review(&project(), "Auth & Billing", 4, 2, 3);
        assert_eq!(
            requirement.file_name,
            "demo-app-auth-billing-vision-review.md"
        );
        assert!(requirement.markdown.contains("- Files: 4"));
    }
}
