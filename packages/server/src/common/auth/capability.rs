use std::fmt;
use std::str::FromStr;

/// Model permissions understood by the circuits views.
///
/// Codenames follow the `<app>.<action>_<model>` convention so tokens minted
/// for the wider application carry over unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    AddProvider,
    ChangeProvider,
    DeleteProvider,
    AddCircuitType,
    ChangeCircuitType,
    DeleteCircuitType,
    AddCircuit,
    ChangeCircuit,
    DeleteCircuit,
}

impl Permission {
    pub const ALL: [Permission; 9] = [
        Permission::AddProvider,
        Permission::ChangeProvider,
        Permission::DeleteProvider,
        Permission::AddCircuitType,
        Permission::ChangeCircuitType,
        Permission::DeleteCircuitType,
        Permission::AddCircuit,
        Permission::ChangeCircuit,
        Permission::DeleteCircuit,
    ];

    pub fn codename(&self) -> &'static str {
        match self {
            Permission::AddProvider => "circuits.add_provider",
            Permission::ChangeProvider => "circuits.change_provider",
            Permission::DeleteProvider => "circuits.delete_provider",
            Permission::AddCircuitType => "circuits.add_circuittype",
            Permission::ChangeCircuitType => "circuits.change_circuittype",
            Permission::DeleteCircuitType => "circuits.delete_circuittype",
            Permission::AddCircuit => "circuits.add_circuit",
            Permission::ChangeCircuit => "circuits.change_circuit",
            Permission::DeleteCircuit => "circuits.delete_circuit",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codename())
    }
}

impl FromStr for Permission {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.codename() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown permission: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codename_roundtrip() {
        for permission in Permission::ALL {
            assert_eq!(permission.codename().parse::<Permission>().unwrap(), permission);
        }
    }

    #[test]
    fn test_unknown_codename() {
        assert!("dcim.change_site".parse::<Permission>().is_err());
    }
}
