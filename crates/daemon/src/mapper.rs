use common::{AppInstance, BackendRecord};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("instance {id} on {host} exposes no ports")]
    NoPorts { id: String, host: String },
}

/// One backend per instance, in resolution order, on the instance's first port.
pub fn to_backends(instances: &[AppInstance]) -> Result<Vec<BackendRecord>, MappingError> {
    instances
        .iter()
        .map(|instance| {
            let port = *instance.ports.first().ok_or_else(|| MappingError::NoPorts {
                id: instance.id.clone(),
                host: instance.host.clone(),
            })?;
            Ok(BackendRecord {
                name: instance.id.clone(),
                host: instance.host.clone(),
                port,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{instance, record};

    #[test]
    fn uses_first_port_only() {
        let backends = to_backends(&[instance("app.1", "10.0.0.5", &[8080, 9090])]).unwrap();
        assert_eq!(backends, vec![record("app.1", "10.0.0.5", 8080)]);
    }

    #[test]
    fn preserves_order() {
        let backends = to_backends(&[
            instance("b", "10.0.0.2", &[2]),
            instance("a", "10.0.0.1", &[1]),
        ])
        .unwrap();
        let names: Vec<_> = backends.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn empty_port_list_is_an_error() {
        let err = to_backends(&[
            instance("ok", "10.0.0.1", &[80]),
            instance("bad", "10.0.0.2", &[]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            MappingError::NoPorts { id: "bad".to_string(), host: "10.0.0.2".to_string() }
        );
    }
}
