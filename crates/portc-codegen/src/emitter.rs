//! State shared by every target while one output is written.

use portc_core::{ClassId, ConstId, ConstOwner, ConstValue, EnumId, MethodId, SymbolRef, Type};
use portc_lowering::Lowering;
use portc_registry::Program;

use crate::names::{Frame, Names};
use crate::writer::SourceWriter;
use crate::{Target, c, csharp, java, js, literal};

/// Name of the generated holder of binary resources.
pub(crate) const RESOURCE_HOLDER: &str = "PortcResource";

pub(crate) struct Emitter<'a, 'p> {
    pub target: Target,
    pub program: &'p Program,
    pub lowering: &'a Lowering<'p>,
    pub names: Names,
    pub out: SourceWriter,
    /// Contents of every resource, indexed by `ResourceId`.
    pub resources: Vec<Vec<u8>>,
    /// The method whose body is being written.
    current: Option<(MethodId, Frame)>,
}

impl<'a, 'p> Emitter<'a, 'p> {
    pub fn new(target: Target, lowering: &'a Lowering<'p>, resources: Vec<Vec<u8>>) -> Self {
        let program = lowering.program();
        Self {
            target,
            program,
            lowering,
            names: Names::new(program, target),
            out: SourceWriter::new(),
            resources,
            current: None,
        }
    }

    /// Hand back what was written so far and start a new output.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.out).finish()
    }

    // ==========================================================================
    // Method context
    // ==========================================================================

    pub fn enter(&mut self, method: MethodId) {
        let frame = self.names.frame(self.program, method);
        self.current = Some((method, frame));
    }

    pub fn leave(&mut self) {
        self.current = None;
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.current.as_ref().map(|(_, frame)| frame)
    }

    pub fn current_method(&self) -> Option<MethodId> {
        self.current.as_ref().map(|(id, _)| *id)
    }

    pub fn current_class(&self) -> Option<ClassId> {
        self.current_method().map(|m| self.program.method(m).owner)
    }

    // ==========================================================================
    // Names
    // ==========================================================================

    pub fn class_name(&self, id: ClassId) -> String {
        self.names.ident(&self.program.class(id).name)
    }

    pub fn enum_name(&self, id: EnumId) -> String {
        self.names.ident(&self.program.enum_entry(id).name)
    }

    /// `E_A` in C, `E.A` elsewhere.
    pub fn enum_member(&self, id: EnumId, index: u32) -> String {
        let entry = self.program.enum_entry(id);
        let value = entry.values.get(index as usize).map_or("", |v| v.name.as_str());
        let sep = if self.target.is_c() { "_" } else { "." };
        format!("{}{sep}{}", self.enum_name(id), self.names.ident(value))
    }

    /// Name of a class-level or method-local array constant.
    pub fn const_array_name(&self, id: ConstId) -> String {
        let entry = self.program.const_entry(id);
        match entry.owner {
            ConstOwner::Class(class) => {
                let sep = if self.target.is_c() { "_" } else { "." };
                format!("{}{sep}{}", self.class_name(class), self.names.ident(&entry.name))
            }
            ConstOwner::Method(_) => self
                .frame()
                .and_then(|f| f.consts.get(&id).cloned())
                .unwrap_or_else(|| self.names.ident(&entry.name)),
        }
    }

    pub fn resource_name(&self, id: portc_core::ResourceId) -> String {
        let sep = if self.target.is_c() { "_" } else { "." };
        format!("{RESOURCE_HOLDER}{sep}{}", self.names.resource(id))
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    /// `ty` as written in a declaration of `name`.
    pub fn declaration(&self, ty: &Type, name: &str) -> String {
        match self.target {
            Target::C89 | Target::C99 => c::declarator(self, ty, name),
            Target::JavaScript => format!("let {name}"),
            Target::CSharp | Target::Java => format!("{} {name}", self.type_name(ty)),
        }
    }

    /// `ty` as written in a cast.
    pub fn type_name(&self, ty: &Type) -> String {
        match self.target {
            Target::C89 | Target::C99 => c::declarator(self, ty, ""),
            Target::CSharp => csharp::type_name(self, ty),
            Target::Java => java::type_name(self, ty),
            Target::JavaScript => String::new(),
        }
    }

    /// A fresh array of `len` default elements.
    pub fn new_array(&self, elem: &Type, len: &str) -> String {
        match self.target {
            Target::C89 | Target::C99 => {
                let pointer = Type::array(elem.clone(), None);
                format!(
                    "({}) calloc({len}, sizeof({}))",
                    c::declarator(self, &pointer, ""),
                    c::declarator(self, elem, "")
                )
            }
            Target::CSharp => csharp::new_array(self, elem, len),
            Target::Java => java::new_array(self, elem, len),
            Target::JavaScript => js::new_array(self, elem, len),
        }
    }

    /// Storage for a fixed array on managed targets.
    pub fn fixed_array_storage(&self, ty: &Type) -> Option<String> {
        match ty {
            Type::Array { elem, len: Some(n) } => Some(self.new_array(elem, &n.to_string())),
            _ => None,
        }
    }

    // ==========================================================================
    // Literals
    // ==========================================================================

    /// Folded value of a constant.
    pub fn const_value(&self, id: ConstId) -> Option<ConstValue> {
        self.lowering.constant_value_of(SymbolRef::Const(id))
    }

    /// Folded value of the `index`th member of an enum.
    pub fn enum_value(&self, id: EnumId, index: u32) -> i64 {
        match self.lowering.constant_value_of(SymbolRef::EnumValue(id, index)) {
            Some(ConstValue::Enum { value, .. }) => value,
            _ => 0,
        }
    }

    /// A constant of type `ty`.
    pub fn constant(&self, value: &ConstValue, ty: &Type) -> String {
        let t = self.target;
        match value {
            ConstValue::Null => if t.is_c() { "NULL" } else { "null" }.to_string(),
            ConstValue::Bool(b) => match (t, b) {
                (Target::C89, true) => "1".to_string(),
                (Target::C89, false) => "0".to_string(),
                _ => b.to_string(),
            },
            ConstValue::String(s) => literal::string(t, s),
            ConstValue::Enum { id, value } => self.enum_constant(*id, *value),
            ConstValue::Array(items) => {
                let elem = ty.element_type().cloned().unwrap_or_default();
                self.array_literal(items, &elem)
            }
            ConstValue::Int(_) | ConstValue::Float(_) => self.number(value, ty),
        }
    }

    fn number(&self, value: &ConstValue, ty: &Type) -> String {
        let t = self.target;
        match ty {
            Type::Float | Type::Double => literal::float(t, value.as_f64().unwrap_or_default(), *ty == Type::Float),
            Type::Long => literal::long(t, value.as_int().unwrap_or_default()),
            Type::Byte if t == Target::Java => format!("(byte) {}", value.as_int().unwrap_or_default()),
            Type::Enum(id) => self.enum_constant(*id, value.as_int().unwrap_or_default()),
            _ => match value {
                ConstValue::Float(f) => literal::float(t, f.0, false),
                _ => literal::int(t, value.as_int().unwrap_or_default()),
            },
        }
    }

    fn enum_constant(&self, id: EnumId, value: i64) -> String {
        let entry = self.program.enum_entry(id);
        match entry.values.iter().position(|v| v.value == value) {
            Some(index) => self.enum_member(id, index as u32),
            None => match self.target {
                Target::C89 | Target::C99 | Target::CSharp => format!("({}) {value}", self.enum_name(id)),
                Target::Java | Target::JavaScript => value.to_string(),
            },
        }
    }

    /// Initializer list of an array constant.
    pub fn array_literal(&self, items: &[ConstValue], elem: &Type) -> String {
        let items: Vec<String> = items.iter().map(|v| self.constant(v, elem)).collect();
        match self.target {
            Target::JavaScript => format!("[ {} ]", items.join(", ")),
            _ => format!("{{ {} }}", items.join(", ")),
        }
    }

    // ==========================================================================
    // Layout helpers
    // ==========================================================================

    /// `// text` or `/* text */`.
    pub fn comment(&self, text: &str) -> String {
        if self.target == Target::C89 {
            format!("/* {text} */")
        } else {
            format!("// {text}")
        }
    }

    /// Write `header` and open a braced body.
    pub fn open(&mut self, header: &str) {
        if self.target.allman() {
            self.out.writeln(header);
            self.out.writeln("{");
        } else {
            self.out.writeln(&format!("{header} {{"));
        }
        self.out.indent();
    }

    /// Close a body and open the next one of the same statement.
    pub fn reopen(&mut self, header: &str) {
        self.out.dedent();
        if self.target.allman() {
            self.out.writeln("}");
            self.out.writeln(header);
            self.out.writeln("{");
        } else {
            self.out.writeln(&format!("}} {header} {{"));
        }
        self.out.indent();
    }

    pub fn close(&mut self) {
        self.close_with("}");
    }

    pub fn close_with(&mut self, line: &str) {
        self.out.dedent();
        self.out.writeln(line);
    }
}
