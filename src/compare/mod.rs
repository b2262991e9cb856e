pub mod batch;
pub mod duplicates;
pub mod kinematics;
pub mod tools;

pub use batch::{get_model_information, get_models_information, search_for_urdfs};
pub use duplicates::{
    DiffResult, DuplicateDiff, DuplicateReport, RobotDescriptor, SourceDescriptor, SourceStats,
    compare_duplicates,
};
pub use kinematics::{CommandKinematics, Kinematics, Pose};
pub use tools::{ToolComparison, UrdfTool, build_tool, compare_tools};
