use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use structured_array::{
    ArgKind, Args, ArrayBuilder, ArrayError, ConstructionContext, Ctor, CtorAndArgs,
    CtorAndArgsProvider, Element, Field, IndexedCtorAndArgsProvider, StructuredArray, cloned,
    defaulted, field,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Particle {
    pub id: u64,
    pub mass: f64,
}

impl Element for Particle {
    const CTORS: &'static [Ctor<Self>] = &[
        Ctor::new("default", &[], defaulted),
        Ctor::new("copy", &[ArgKind::Source], cloned),
        Ctor::new("new", &[ArgKind::UInt, ArgKind::Float], |args| {
            Ok(Particle {
                id: args.uint(0)?,
                mass: args.float(1)?,
            })
        }),
    ];
    const FIELDS: &'static [Field<Self>] =
        &[field!(Particle, id, immutable), field!(Particle, mass)];
    type Mut<'a> = &'a mut Self;
}

/// An element that declares no copyable fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Opaque(pub u64);

impl Element for Opaque {
    const CTORS: &'static [Ctor<Self>] = &[
        Ctor::new("default", &[], defaulted),
        Ctor::new("copy", &[ArgKind::Source], cloned),
        Ctor::new("new", &[ArgKind::UInt], |args| Ok(Opaque(args.uint(0)?))),
    ];
    const FIELDS: &'static [Field<Self>] = &[];
    type Mut<'a> = &'a mut Self;
}

/// `Opaque(1), Opaque(2), ...`
pub fn opaques(length: u64) -> Result<StructuredArray<Opaque>, ArrayError> {
    let ctor = Ctor::<Opaque>::lookup(&[ArgKind::UInt])?;
    StructuredArray::with_provider(
        IndexedCtorAndArgsProvider::new(ctor, |ctx: &ConstructionContext<'_>| {
            Args::new().with(ctx.index() + 1)
        }),
        length,
    )
}

/// `0, 1, 2, ...`
pub fn counting(length: u64) -> Result<StructuredArray<u64>, ArrayError> {
    let ctor = Ctor::<u64>::lookup(&[ArgKind::UInt])?;
    StructuredArray::with_provider(
        IndexedCtorAndArgsProvider::new(ctor, |ctx: &ConstructionContext<'_>| {
            Args::new().with(ctx.index())
        }),
        length,
    )
}

/// `rows` x `cols` array where the element at `[r][c]` is `r * 10 + c`.
pub fn grid(rows: u64, cols: u64) -> Result<StructuredArray<StructuredArray<u64>>, ArrayError> {
    let ctor = Ctor::<u64>::lookup(&[ArgKind::UInt])?;
    let cells = IndexedCtorAndArgsProvider::new(ctor, |ctx: &ConstructionContext<'_>| {
        let row = ctx.containing_context().map_or(0, |parent| parent.index());
        Args::new().with(row * 10 + ctx.index())
    });
    ArrayBuilder::nested(ArrayBuilder::<u64>::new(cols).element_provider(cells), rows)
        .resolve()?
        .build()
}

pub fn particles(length: u64) -> Result<StructuredArray<Particle>, ArrayError> {
    let ctor = Ctor::<Particle>::lookup(&[ArgKind::UInt, ArgKind::Float])?;
    StructuredArray::with_provider(
        IndexedCtorAndArgsProvider::new(ctor, |ctx: &ConstructionContext<'_>| {
            Args::new().with(ctx.index()).with(ctx.index() as f64 * 0.5)
        }),
        length,
    )
}

pub type Log = Arc<Mutex<Vec<Vec<u64>>>>;

/// Records the index path of every element it is asked about, then hands
/// out the zero-argument form.
pub struct Recording<T> {
    log: Log,
    _ty: PhantomData<fn() -> T>,
}

impl<T> Recording<T> {
    pub fn new(log: &Log) -> Self {
        Self {
            log: Arc::clone(log),
            _ty: PhantomData,
        }
    }
}

impl<T: Element> CtorAndArgsProvider<T> for Recording<T> {
    fn for_context<'c>(
        &self,
        ctx: &ConstructionContext<'c>,
    ) -> Result<CtorAndArgs<'c, T>, ArrayError> {
        self.log.lock().unwrap().push(ctx.index_path().to_vec());
        CtorAndArgs::default_for()
    }
}
