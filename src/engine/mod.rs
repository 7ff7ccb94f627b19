// ==========================================
// 包装物料 BOM 系统 - 引擎层
// ==========================================
// 职责: 类别可见性、消耗公式、录入会话、记录组装、编辑流程
// 红线: 引擎不访问数据层，不拼 SQL
// ==========================================

pub mod assembler;
pub mod consumption;
pub mod edit_flow;
pub mod error;
pub mod visibility;
pub mod working_state;

// 重导出核心引擎
pub use assembler::RecordAssembler;
pub use consumption::{
    apply_selection, apply_toggle, compute_quantity, field_visibility, format_quantity,
    formula_hint, recompute, thermopack_film_plan, ConsumptionWording, FieldMode,
    FieldVisibility, FilmPlan, FormulaKind, STAPLE_CONSUMPTION_PER_BOX,
    STRAP_CONSUMPTION_PER_BOX,
};
pub use edit_flow::{EditChanges, EditableLine, RecordEditSession};
pub use error::{AssemblyError, WorkingStateError, WorkingStateResult};
pub use visibility::{slots_for, visible_categories, visible_category_labels};
pub use working_state::{BomEditSession, SlotEntry};
