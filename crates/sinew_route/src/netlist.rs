//! The routed design: one net per connection lane and its committed PIPs.
//!
//! This is the mutation side of the fabric collaborator. Routes write into
//! it only after they are fully resolved.

use crate::ids::NetId;
use serde::{Deserialize, Serialize};
use sinew_common::{InternalError, SinewResult};
use sinew_fabric::{Fabric, TileId, WireId};
use std::collections::HashMap;

/// One programmed interconnect point.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct PipSelection {
    /// The tile holding the PIP.
    pub tile: TileId,
    /// The driving wire.
    pub src: WireId,
    /// The driven wire.
    pub dst: WireId,
}

impl PipSelection {
    /// Formats the PIP as `TILE/SRC->DST`.
    pub fn describe(&self, fabric: &dyn Fabric) -> String {
        let tile_type = fabric.tile_type(self.tile);
        format!(
            "{}/{}->{}",
            fabric.tile_name(self.tile),
            fabric.wire_name(tile_type, self.src),
            fabric.wire_name(tile_type, self.dst)
        )
    }
}

/// A net and the PIPs committed to it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutedNet {
    /// Unique ID within the design.
    pub id: NetId,
    /// Net name, e.g. `bus[3]`.
    pub name: String,
    /// Committed PIPs in route order.
    pub pips: Vec<PipSelection>,
}

impl RoutedNet {
    /// Returns `true` once any PIP has been committed.
    pub fn is_routed(&self) -> bool {
        !self.pips.is_empty()
    }
}

/// All nets of a design together with their routing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoutedDesign {
    /// All nets.
    pub nets: Vec<RoutedNet>,
    /// Auxiliary index: net name to ID (rebuilt on deserialization).
    #[serde(skip)]
    pub net_by_name: HashMap<String, NetId>,
}

impl RoutedDesign {
    /// Creates an empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a net, or returns the existing net of the same name.
    pub fn add_net(&mut self, name: impl Into<String>) -> NetId {
        let name = name.into();
        if let Some(&id) = self.net_by_name.get(&name) {
            return id;
        }
        let id = NetId::from_raw(self.nets.len() as u32);
        self.net_by_name.insert(name.clone(), id);
        self.nets.push(RoutedNet {
            id,
            name,
            pips: Vec::new(),
        });
        id
    }

    /// Returns the net with the given ID.
    pub fn net(&self, id: NetId) -> Option<&RoutedNet> {
        self.nets.get(id.as_raw() as usize)
    }

    /// Looks up a net by name.
    pub fn net_by_name(&self, name: &str) -> Option<&RoutedNet> {
        let id = *self.net_by_name.get(name)?;
        self.net(id)
    }

    /// Appends PIPs to a net.
    pub fn commit_pips(
        &mut self,
        id: NetId,
        pips: impl IntoIterator<Item = PipSelection>,
    ) -> SinewResult<()> {
        let net = self
            .nets
            .get_mut(id.as_raw() as usize)
            .ok_or_else(|| InternalError::new(format!("commit into unknown net {id}")))?;
        net.pips.extend(pips);
        Ok(())
    }

    /// Returns `true` if every net has committed PIPs.
    pub fn is_fully_routed(&self) -> bool {
        self.nets.iter().all(RoutedNet::is_routed)
    }

    /// Rebuilds the name index after deserialization.
    pub fn rebuild_index(&mut self) {
        self.net_by_name = self
            .nets
            .iter()
            .map(|net| (net.name.clone(), net.id))
            .collect();
    }
}
