//! Docker CLI supervisor

use async_trait::async_trait;

use wb_core::traits::Supervisor;
use wb_core::{BootstrapError, ContainerHandle, RunSpec};

use super::command::run_command;

/// Supervises the agent container through the `docker` CLI
pub struct DockerSupervisor {
    docker_bin: String,
}

impl DockerSupervisor {
    pub fn new(docker_bin: impl Into<String>) -> Self {
        Self {
            docker_bin: docker_bin.into(),
        }
    }

    async fn docker(&self, operation: &str, args: Vec<String>) -> Result<String, BootstrapError> {
        run_command(&self.docker_bin, &args)
            .await
            .map_err(|e| BootstrapError::lifecycle(operation, e))
    }
}

/// `docker ps` arguments matching exactly one container name
pub fn find_args(name: &str) -> Vec<String> {
    vec![
        "ps".to_string(),
        "-a".to_string(),
        "-q".to_string(),
        "-f".to_string(),
        format!("name=^{}$", name),
    ]
}

/// `docker run` arguments for a spec
pub fn run_args(spec: &RunSpec) -> Vec<String> {
    let mut args = vec!["run".to_string(), "-d".to_string()];
    if spec.host_network {
        args.extend(["--net".to_string(), "host".to_string()]);
    }
    if spec.restart_always {
        args.extend(["--restart".to_string(), "always".to_string()]);
    }
    args.extend(["--name".to_string(), spec.name.clone()]);
    for (key, value) in &spec.env {
        args.push("--env".to_string());
        args.push(format!("{}={}", key, value));
    }
    args.push(spec.image.clone());
    args
}

#[async_trait]
impl Supervisor for DockerSupervisor {
    async fn find(&self, name: &str) -> Result<Option<ContainerHandle>, BootstrapError> {
        let stdout = self.docker("docker ps", find_args(name)).await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(ContainerHandle::new))
    }

    async fn stop(&self, handle: &ContainerHandle) -> Result<(), BootstrapError> {
        self.docker("docker stop", vec!["stop".to_string(), handle.to_string()])
            .await
            .map(|_| ())
    }

    async fn remove(&self, handle: &ContainerHandle) -> Result<(), BootstrapError> {
        self.docker("docker rm", vec!["rm".to_string(), handle.to_string()])
            .await
            .map(|_| ())
    }

    async fn run(&self, spec: &RunSpec) -> Result<ContainerHandle, BootstrapError> {
        let stdout = self.docker("docker run", run_args(spec)).await?;
        if stdout.is_empty() {
            return Err(BootstrapError::lifecycle(
                "docker run",
                "no container id on stdout",
            ));
        }
        Ok(ContainerHandle::new(stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_args_anchor_name() {
        assert_eq!(
            find_args("proxy-agent"),
            vec!["ps", "-a", "-q", "-f", "name=^proxy-agent$"]
        );
    }

    #[test]
    fn test_run_args() {
        let spec = RunSpec {
            name: "proxy-agent".to_string(),
            image: "gcr.io/inverting-proxy/agent".to_string(),
            env: vec![
                ("BACKEND".to_string(), "b1".to_string()),
                ("PROXY".to_string(), "https://p.test".to_string()),
            ],
            restart_always: true,
            host_network: true,
        };
        assert_eq!(
            run_args(&spec),
            vec![
                "run",
                "-d",
                "--net",
                "host",
                "--restart",
                "always",
                "--name",
                "proxy-agent",
                "--env",
                "BACKEND=b1",
                "--env",
                "PROXY=https://p.test",
                "gcr.io/inverting-proxy/agent",
            ]
        );
    }

    #[test]
    fn test_run_args_defaults_omit_flags() {
        let spec = RunSpec {
            name: "scratch".to_string(),
            image: "busybox".to_string(),
            env: Vec::new(),
            restart_always: false,
            host_network: false,
        };
        assert_eq!(run_args(&spec), vec!["run", "-d", "--name", "scratch", "busybox"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_docker_is_lifecycle_failure() {
        let supervisor = DockerSupervisor::new("false");
        match supervisor.stop(&ContainerHandle::new("abc")).await {
            Err(BootstrapError::AgentLifecycleFailure { operation, .. }) => {
                assert_eq!(operation, "docker stop")
            }
            other => panic!("expected AgentLifecycleFailure, got {other:?}"),
        }
    }
}
