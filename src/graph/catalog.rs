//! Built-in node type catalog for the in-memory store.

use crate::graph::store::NodeTypeInfo;

/// Default value and kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    Float(f64),
    Int(i64),
    Toggle(bool),
    Str(&'static str),
    /// Current value and the allowed options.
    Menu(&'static str, &'static [&'static str]),
    /// Path of another node; empty for none.
    OpRef(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: ParamDefault,
}

#[derive(Debug, Clone, Copy)]
pub struct TypeSpec {
    pub family: &'static str,
    /// Type name without family suffix, e.g. `noise`.
    pub name: &'static str,
    pub inputs: usize,
    pub outputs: usize,
    pub params: &'static [ParamSpec],
}

impl TypeSpec {
    /// Full op type, e.g. `noiseTOP`.
    pub fn op_type(&self) -> String {
        format!("{}{}", self.name, self.family)
    }

    /// Only components hold child nodes.
    pub fn is_container(&self) -> bool {
        self.family == "COMP"
    }

    pub fn info(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            family: self.family.to_string(),
            type_name: self.name.to_string(),
            op_type: self.op_type(),
            inputs: self.inputs,
            outputs: self.outputs,
        }
    }
}

const fn p(name: &'static str, default: ParamDefault) -> ParamSpec {
    ParamSpec { name, default }
}

use ParamDefault::{Float, Int, Menu, OpRef, Str, Toggle};

const NOISE_TYPES: &[&str] = &["simplex3d", "perlin3d", "random"];
const COMPOSITE_OPS: &[&str] = &["add", "multiply", "over", "under", "difference"];
const WAVE_TYPES: &[&str] = &["sin", "gaussian", "triangle", "ramp", "square"];
const MATH_COMBINE: &[&str] = &["off", "add", "subtract", "multiply", "average"];
const DAT_FORMATS: &[&str] = &["text", "table"];

/// Plain component; also the type of the absolute root.
pub const BASE_COMP: TypeSpec = TypeSpec {
    family: "COMP",
    name: "base",
    inputs: 0,
    outputs: 0,
    params: &[p("opviewer", OpRef(""))],
};

/// Type of the project root.
pub const CONTAINER_COMP: TypeSpec = TypeSpec {
    family: "COMP",
    name: "container",
    inputs: 0,
    outputs: 0,
    params: &[
        p("w", Int(1280)),
        p("h", Int(720)),
        p("opviewer", OpRef("")),
    ],
};

pub const CATALOG: &[TypeSpec] = &[
    TypeSpec {
        family: "TOP",
        name: "noise",
        inputs: 0,
        outputs: 1,
        params: &[
            p("type", Menu("simplex3d", NOISE_TYPES)),
            p("seed", Float(1.0)),
            p("period", Float(1.0)),
            p("amp", Float(0.5)),
            p("monochrome", Toggle(true)),
            p("resolutionw", Int(256)),
            p("resolutionh", Int(256)),
        ],
    },
    TypeSpec {
        family: "TOP",
        name: "constant",
        inputs: 0,
        outputs: 1,
        params: &[
            p("colorr", Float(1.0)),
            p("colorg", Float(1.0)),
            p("colorb", Float(1.0)),
            p("alpha", Float(1.0)),
        ],
    },
    TypeSpec {
        family: "TOP",
        name: "level",
        inputs: 1,
        outputs: 1,
        params: &[
            p("opacity", Float(1.0)),
            p("brightness1", Float(1.0)),
            p("invert", Float(0.0)),
        ],
    },
    TypeSpec {
        family: "TOP",
        name: "composite",
        inputs: 2,
        outputs: 1,
        params: &[p("operand", Menu("over", COMPOSITE_OPS))],
    },
    TypeSpec {
        family: "TOP",
        name: "null",
        inputs: 1,
        outputs: 1,
        params: &[],
    },
    TypeSpec {
        family: "CHOP",
        name: "wave",
        inputs: 0,
        outputs: 1,
        params: &[
            p("wavetype", Menu("sin", WAVE_TYPES)),
            p("frequency", Float(1.0)),
            p("amplitude", Float(1.0)),
        ],
    },
    TypeSpec {
        family: "CHOP",
        name: "noise",
        inputs: 0,
        outputs: 1,
        params: &[p("seed", Float(1.0)), p("amp", Float(1.0))],
    },
    TypeSpec {
        family: "CHOP",
        name: "math",
        inputs: 2,
        outputs: 1,
        params: &[
            p("chopop", Menu("off", MATH_COMBINE)),
            p("gain", Float(1.0)),
        ],
    },
    TypeSpec {
        family: "CHOP",
        name: "null",
        inputs: 1,
        outputs: 1,
        params: &[],
    },
    TypeSpec {
        family: "SOP",
        name: "box",
        inputs: 0,
        outputs: 1,
        params: &[
            p("sizex", Float(1.0)),
            p("sizey", Float(1.0)),
            p("sizez", Float(1.0)),
        ],
    },
    TypeSpec {
        family: "SOP",
        name: "sphere",
        inputs: 0,
        outputs: 1,
        params: &[
            p("rad", Float(1.0)),
            p("rows", Int(10)),
            p("cols", Int(20)),
        ],
    },
    TypeSpec {
        family: "SOP",
        name: "transform",
        inputs: 1,
        outputs: 1,
        params: &[
            p("tx", Float(0.0)),
            p("ty", Float(0.0)),
            p("tz", Float(0.0)),
        ],
    },
    TypeSpec {
        family: "DAT",
        name: "text",
        inputs: 0,
        outputs: 1,
        params: &[
            p("text", Str("")),
            p("format", Menu("text", DAT_FORMATS)),
        ],
    },
    TypeSpec {
        family: "DAT",
        name: "table",
        inputs: 0,
        outputs: 1,
        params: &[p("rows", Int(1)), p("cols", Int(1))],
    },
    BASE_COMP,
    CONTAINER_COMP,
    TypeSpec {
        family: "COMP",
        name: "geometry",
        inputs: 0,
        outputs: 0,
        params: &[
            p("material", OpRef("")),
            p("render", Toggle(true)),
        ],
    },
    TypeSpec {
        family: "MAT",
        name: "phong",
        inputs: 0,
        outputs: 1,
        params: &[
            p("diffr", Float(1.0)),
            p("diffg", Float(1.0)),
            p("diffb", Float(1.0)),
            p("colormap", OpRef("")),
        ],
    },
    TypeSpec {
        family: "MAT",
        name: "constant",
        inputs: 0,
        outputs: 1,
        params: &[
            p("colorr", Float(1.0)),
            p("colorg", Float(1.0)),
            p("colorb", Float(1.0)),
        ],
    },
];

/// Look up a type by its full op type name.
pub fn lookup(op_type: &str) -> Option<&'static TypeSpec> {
    CATALOG.iter().find(|spec| {
        op_type.len() == spec.name.len() + spec.family.len()
            && op_type.starts_with(spec.name)
            && op_type.ends_with(spec.family)
    })
}
