//! Prints every GitLab provider CRD as a multi-document YAML stream
//!
//! Usage: `cargo run -p crds --bin crdgen > config/crds/gitlab.yaml`

use crds::*;
use kube::CustomResourceExt;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;

fn main() -> anyhow::Result<()> {
    let crds: Vec<CustomResourceDefinition> = vec![
        ProviderConfig::crd(),
        // projects
        Project::crd(),
        ProjectMember::crd(),
        ProjectHook::crd(),
        ProjectVariable::crd(),
        ProjectDeployKey::crd(),
        ProjectDeployToken::crd(),
        ProjectAccessToken::crd(),
        PipelineSchedule::crd(),
        ProjectApprovalRule::crd(),
        Runner::crd(),
        MattermostIntegration::crd(),
        // groups
        Group::crd(),
        GroupMember::crd(),
        GroupVariable::crd(),
        GroupDeployToken::crd(),
        GroupAccessToken::crd(),
        GroupLdapLink::crd(),
        GroupSamlLink::crd(),
        // instance
        License::crd(),
        ApplicationSettings::crd(),
    ];

    for crd in crds {
        let yaml = serde_yaml::to_string(&crd)
            .map_err(|e| anyhow::anyhow!("Failed to serialize CRD: {}", e))?;
        println!("---");
        print!("{yaml}");
    }
    Ok(())
}
