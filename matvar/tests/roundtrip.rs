//! Integration tests: values written with `Writer` and read back with `Reader`.

use approx::assert_abs_diff_eq;
use matvar::{Cell, ClassType, Compression, Error, ErrorKind, Reader, Struct, Variable, Writer};
use matvar_format::NumericData;
use ndarray::{array, Array1, Array2};
use tempfile::NamedTempFile;

/// Helper to create a temporary MAT file path.
fn temp_mat_path() -> NamedTempFile {
    NamedTempFile::new().expect("Failed to create temp file")
}

#[test]
fn test_greeting_scenario() -> matvar::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out.mat");

    let mut writer = Writer::create(&path)?;
    writer.write("greeting", Variable::from("hello"))?;
    writer.close()?;

    let reader = Reader::open(&path)?;
    assert!(reader.has_variable("greeting"));
    assert_eq!(reader.read("greeting")?.to_text()?, "hello");
    Ok(())
}

#[test]
fn test_vector_roundtrip() -> matvar::Result<()> {
    let temp = temp_mat_path();
    let row = array![0.1, -2.5, 3.75, 1e-12, f64::MAX];
    let col: Array1<f64> = Array1::linspace(0.0, 1.0, 11);

    let mut writer = Writer::create(temp.path())?;
    writer.write("row", Variable::from(&row))?;
    writer.write("col", Variable::column(&col))?;
    writer.close()?;

    let reader = Reader::open(temp.path())?;
    let read_row = reader.read("row")?;
    assert_eq!(read_row.dims(), &[1, 5]);
    assert_eq!(read_row.to_array1()?, row);

    let read_col = reader.read("col")?;
    assert_eq!(read_col.dims(), &[11, 1]);
    let read_col = read_col.to_array1()?;
    for (a, b) in read_col.iter().zip(col.iter()) {
        assert_abs_diff_eq!(a, b);
    }
    Ok(())
}

#[test]
fn test_matrix_roundtrip_keeps_extents() -> matvar::Result<()> {
    let temp = temp_mat_path();
    let m = Array2::from_shape_fn((3, 4), |(r, c)| (r * 10 + c) as f64 / 3.0);

    let mut writer = Writer::create(temp.path())?;
    writer.write("m", Variable::from(&m))?;
    writer.close()?;

    let reader = Reader::open(temp.path())?;
    let info = reader.info("m")?;
    assert_eq!(info.class, ClassType::Double);
    assert_eq!(info.dims, vec![3, 4]);
    assert!(!info.complex);

    let back: Array2<f64> = (&reader.read("m")?).try_into()?;
    assert_eq!(back.dim(), (3, 4));
    for (a, b) in back.iter().zip(m.iter()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-15);
    }
    Ok(())
}

#[test]
fn test_uninstantiated_conversions_fail() {
    let v = Variable::empty();
    for err in [
        v.to_array1().unwrap_err(),
        v.to_array2().unwrap_err(),
        v.to_text().unwrap_err(),
        v.to_scalar().unwrap_err(),
    ] {
        assert!(matches!(err, Error::NotInstantiated));
        assert_eq!(err.kind(), ErrorKind::Cast);
    }
    assert!(matches!(Variable::empty().into_cell(), Err(Error::NotInstantiated)));
    assert!(matches!(Variable::empty().into_struct(), Err(Error::NotInstantiated)));
}

#[test]
fn test_cross_type_conversions_fail() {
    let matrix = Variable::from(&array![[1.0, 2.0], [3.0, 4.0]]);
    let text = Variable::from("abc");

    let err = matrix.to_text().unwrap_err();
    assert!(matches!(err, Error::Cast { target: "String", .. }));
    let err = text.to_array2().unwrap_err();
    assert!(matches!(err, Error::Cast { .. }));
    assert!(text.to_array1().unwrap_err().is_cast());
}

#[test]
fn test_complex_roundtrip_rejects_real_conversions() -> matvar::Result<()> {
    let temp = temp_mat_path();
    let record = matvar::Record::complex(
        vec![1, 3],
        NumericData::Double(vec![1.0, 2.0, 3.0]),
        NumericData::Double(vec![0.0, -1.0, 1.0]),
    )?;

    let mut writer = Writer::create(temp.path())?;
    writer.write("z", Variable::from_record(record))?;
    writer.close()?;

    let reader = Reader::open(temp.path())?;
    let z = reader.read("z")?;
    assert!(z.is_complex());
    assert_eq!(z.dims(), &[1, 3]);
    assert_eq!(z.to_array1().unwrap_err().kind(), ErrorKind::Cast);
    assert_eq!(z.to_array2().unwrap_err().kind(), ErrorKind::Cast);
    assert_eq!(z.to_scalar().unwrap_err().kind(), ErrorKind::Cast);
    Ok(())
}

#[test]
fn test_overflowing_shapes_fail_to_create() {
    let huge = [1usize << 40, 1 << 40];
    assert!(matches!(
        Cell::new(&huge, false),
        Err(Error::CreateFailed { .. })
    ));
    assert!(matches!(
        Struct::new(&huge, &["a"]),
        Err(Error::CreateFailed { .. })
    ));
    assert!(matches!(
        Variable::from_shape_vec(huge.to_vec(), Vec::new()),
        Err(Error::CreateFailed { .. })
    ));
}

#[test]
fn test_malformed_cell_read_is_an_error() -> matvar::Result<()> {
    let temp = temp_mat_path();
    let mut writer = Writer::create(temp.path())?;
    writer.write("ok", Variable::from(1.0))?;
    writer.close()?;

    // Cell "e" claiming 0x7fffffff^3 slots and carrying none.
    let mut content = Vec::new();
    for word in [6u32, 8, 1, 0, 5, 12] {
        content.extend_from_slice(&word.to_le_bytes());
    }
    for _ in 0..3 {
        content.extend_from_slice(&0x7fff_ffffi32.to_le_bytes());
    }
    content.extend_from_slice(&[0; 4]);
    content.extend_from_slice(&((1u32 << 16) | 1).to_le_bytes());
    content.extend_from_slice(&[b'e', 0, 0, 0]);
    let mut bytes = std::fs::read(temp.path())?;
    bytes.extend_from_slice(&14u32.to_le_bytes());
    bytes.extend_from_slice(&(content.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&content);
    std::fs::write(temp.path(), &bytes)?;

    let reader = Reader::open(temp.path())?;
    assert!(reader.has_variable("e"));
    assert!(matches!(reader.read("e"), Err(Error::Format(_))));
    assert_eq!(reader.read("ok")?.to_scalar()?, 1.0);
    Ok(())
}

#[test]
fn test_prefilled_cell_slots() -> matvar::Result<()> {
    let cell = Cell::new(&[2, 3], true)?;
    assert_eq!(cell.nelems(), 6);
    for index in 0..6 {
        let slot = cell.get(index)?;
        assert!(slot.is_empty());
        assert_eq!(slot.dims(), &[0, 0]);
    }
    Ok(())
}

#[test]
fn test_set_past_end_always_out_of_bounds() -> matvar::Result<()> {
    for fill in [false, true] {
        let mut cell = Cell::new(&[2, 3], fill)?;
        for index in [6, 7, 100] {
            let err = cell.set(index, Variable::from(1.0)).unwrap_err();
            assert!(matches!(err, Error::OutOfBounds { len: 6, .. }));
            assert_eq!(err.kind(), ErrorKind::Usage);
        }
    }

    let mut s = Struct::new(&[2, 3], &["f"])?;
    for index in [6, 7, 100] {
        let err = s.set("f", index, Variable::from(1.0)).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { len: 6, .. }));
    }
    Ok(())
}

#[test]
fn test_struct_from_cell_fails() -> matvar::Result<()> {
    let cell = Cell::new(&[1, 1], true)?;
    let err = Struct::try_from(cell.into_variable()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cast);
    Ok(())
}

#[test]
fn test_nested_containers_roundtrip() -> matvar::Result<()> {
    let temp = temp_mat_path();

    let mut inner = Cell::new(&[1, 2], false)?;
    inner.set(0, Variable::from("deep"))?;
    inner.set(1, Variable::from(&array![1.0, 2.0, 3.0]))?;

    let mut s = Struct::new(&[1, 2], &["label", "items"])?;
    s.set("label", 0, Variable::from("first"))?;
    s.set("label", 1, Variable::from("second"))?;
    s.set("items", 0, inner.into_variable())?;
    // items(2) stays unset and is written as an empty placeholder.

    let mut outer = Cell::new(&[2, 1], false)?;
    outer.set(0, s.into_variable())?;
    outer.set(1, Variable::from(7.0))?;

    let mut writer = Writer::create(temp.path())?;
    writer.write("outer", outer.into_variable())?;
    writer.close()?;

    let reader = Reader::open(temp.path())?;
    let outer = reader.read("outer")?.into_cell()?;
    assert_eq!(outer.dims(), &[2, 1]);
    assert_eq!(outer.get(1)?.to_scalar()?, 7.0);

    let s = outer.get(0)?.to_variable().into_struct()?;
    assert_eq!(s.fields(), ["label", "items"]);
    assert_eq!(s.get("label", 1)?.to_text()?, "second");
    assert!(s.get("items", 1)?.is_empty());

    let inner = s.get("items", 0)?.to_variable().into_cell()?;
    assert_eq!(inner.get(0)?.to_text()?, "deep");
    assert_eq!(inner.get_at(&[0, 1])?.to_array1()?, array![1.0, 2.0, 3.0]);
    Ok(())
}

#[test]
fn test_compressed_writes() -> matvar::Result<()> {
    let temp = temp_mat_path();
    let big = Array2::<f64>::zeros((64, 64));

    let mut writer = Writer::builder()
        .header("compressed test")
        .compression(Compression::Zlib)
        .create(temp.path())?;
    writer.write("z", Variable::from(&big))?;
    writer.write_with("plain", Variable::from(&big), Compression::None)?;
    writer.close()?;

    let reader = Reader::open(temp.path())?;
    assert_eq!(reader.header(), "compressed test");
    assert!(reader.info("z")?.compressed);
    assert!(!reader.info("plain")?.compressed);
    assert_eq!(reader.read("z")?.to_array2()?, big);
    assert_eq!(reader.variable_names(), ["z", "plain"]);
    Ok(())
}

#[test]
fn test_missing_variable() -> matvar::Result<()> {
    let temp = temp_mat_path();
    Writer::create(temp.path())?.close()?;

    let reader = Reader::open(temp.path())?;
    assert!(!reader.has_variable("nothing"));
    assert!(matches!(
        reader.read("nothing"),
        Err(Error::NoSuchVariable { .. })
    ));
    assert!(matches!(
        reader.info("nothing"),
        Err(Error::NoSuchVariable { .. })
    ));
    Ok(())
}

#[test]
fn test_drop_closes_writer() -> matvar::Result<()> {
    let temp = temp_mat_path();
    {
        let mut writer = Writer::create(temp.path())?;
        writer.write("x", Variable::from(1.5))?;
    }
    let reader = Reader::open(temp.path())?;
    assert_eq!(reader.read("x")?.to_scalar()?, 1.5);
    Ok(())
}

#[test]
fn test_empty_text_roundtrip() -> matvar::Result<()> {
    let temp = temp_mat_path();
    let mut writer = Writer::create(temp.path())?;
    writer.write("blank", Variable::from(String::new()))?;
    writer.close()?;

    let reader = Reader::open(temp.path())?;
    let blank = reader.read("blank")?;
    assert_eq!(blank.class(), ClassType::Char);
    assert_eq!(blank.to_text()?, "");
    Ok(())
}
