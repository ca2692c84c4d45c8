// crates/al_geom/src/lib.rs

//! AeroLattice 几何层
//!
//! 提供求解器消费的面元化几何表示：
//!
//! - [`node`]: 带法向累积的索引化节点
//! - [`panel`]: 二维/三维面元（`Panel2d`/`Panel3`/`Panel4`）与局部坐标系
//! - [`mesh`]: 四边形格栅网格 [`QuadMesh`] 及其验证
//! - [`foil`]: 二维翼型与 NACA 四位数字生成器
//! - [`polar`]: 二维极曲线配置与累积结果
//! - [`rig`]: 机翼/帆/船体的最小几何描述与格栅化
//!
//! 几何对象在任务运行期间只读；任务对面元做逐工况旋转时
//! 操作的是自己的私有副本（见 `Panel4::rotated_about`）。

#![warn(clippy::all)]

pub mod foil;
pub mod mesh;
pub mod node;
pub mod panel;
pub mod polar;
pub mod rig;

pub use foil::Foil;
pub use mesh::QuadMesh;
pub use node::Node;
pub use panel::{Panel2d, Panel3, Panel4};
pub use polar::{Polar2d, PolarType};
pub use rig::{Boat, BoatPolar, HullPatch, Sail, Wing, WingSection};
