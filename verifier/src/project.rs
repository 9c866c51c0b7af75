//! The Apache APISIX projects whose release candidates can be verified.

use serde::Serialize;
use std::fmt;

/// Organisation prefix used in every project's source-archive filename.
pub const APACHE_PREFIX: &str = "apache";

/// A project published under the APISIX distribution area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Project {
    /// The API gateway itself.
    Apisix,
    /// The web dashboard.
    Dashboard,
    /// The Go plugin runner.
    GoPluginRunner,
    /// The Kubernetes ingress controller.
    IngressController,
}

impl Project {
    /// Every known project.
    pub const ALL: [Self; 4] = [
        Self::Apisix,
        Self::Dashboard,
        Self::GoPluginRunner,
        Self::IngressController,
    ];

    /// Package name used in dist directory and archive names.
    #[must_use]
    pub fn package(self) -> &'static str {
        match self {
            Self::Apisix => "apisix",
            Self::Dashboard => "apisix-dashboard",
            Self::GoPluginRunner => "apisix-go-plugin-runner",
            Self::IngressController => "apisix-ingress-controller",
        }
    }

    /// Whether the dist directory embeds the package name.
    #[must_use]
    pub fn is_sub_project(self) -> bool {
        !matches!(self, Self::Apisix)
    }

    /// Repository name on the source host; always the package name.
    #[must_use]
    pub fn repository(self) -> &'static str {
        self.package()
    }

    /// Distribution prefix for source-archive filenames.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        APACHE_PREFIX
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.package())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Project::Apisix, "apisix", false)]
    #[case(Project::Dashboard, "apisix-dashboard", true)]
    #[case(Project::GoPluginRunner, "apisix-go-plugin-runner", true)]
    #[case(Project::IngressController, "apisix-ingress-controller", true)]
    fn identities(#[case] project: Project, #[case] package: &str, #[case] sub_project: bool) {
        assert_eq!(project.package(), package);
        assert_eq!(project.is_sub_project(), sub_project);
        assert_eq!(project.repository(), package);
        assert_eq!(project.prefix(), "apache");
    }

    #[test]
    fn display_is_package_name() {
        for project in Project::ALL {
            assert_eq!(project.to_string(), project.package());
        }
    }
}
