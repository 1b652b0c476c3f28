//! Cube and axis geometry issued through the immediate-mode recorder.

use crate::immediate::{FixedFunction, frame::Primitive, light::Rgba};

/// Length of each axis segment.
pub const AXIS_LENGTH: f32 = 75.0;

struct Face {
    normal: [f32; 3],
    /// Corner signs, counter-clockwise seen from outside.
    corners: [[f32; 3]; 4],
}

const FACES: [Face; 6] = [
    // front (+Z)
    Face {
        normal: [0.0, 0.0, 1.0],
        corners: [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
    },
    // back (-Z)
    Face {
        normal: [0.0, 0.0, -1.0],
        corners: [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]],
    },
    // left (-X)
    Face {
        normal: [-1.0, 0.0, 0.0],
        corners: [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
    },
    // right (+X)
    Face {
        normal: [1.0, 0.0, 0.0],
        corners: [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
    },
    // top (+Y)
    Face {
        normal: [0.0, 1.0, 0.0],
        corners: [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]],
    },
    // bottom (-Y)
    Face {
        normal: [0.0, -1.0, 0.0],
        corners: [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
    },
];

fn centered_cube(gl: &mut FixedFunction, size: f32, colour: Rgba, with_normals: bool) {
    let h = size / 2.0;
    gl.color(colour);
    gl.begin(Primitive::Quads);
    for face in &FACES {
        if with_normals {
            let [x, y, z] = face.normal;
            gl.normal(x, y, z);
        }
        for [x, y, z] in face.corners {
            gl.vertex(x * h, y * h, z * h);
        }
    }
    gl.end();
}

/// Cube of edge `size` centred on the origin, one normal per face.
pub fn draw_lit_centered_cube(gl: &mut FixedFunction, size: f32, colour: Rgba) {
    centered_cube(gl, size, colour, true);
}

/// Same cube without normals, meant to be drawn with lighting off.
pub fn draw_unlit_centered_cube(gl: &mut FixedFunction, size: f32, colour: Rgba) {
    centered_cube(gl, size, colour, false);
}

/// X, Y and Z from the origin, each in its own colour.
pub fn draw_axes(gl: &mut FixedFunction, colours: [Rgba; 3]) {
    gl.begin(Primitive::Lines);
    for (axis, colour) in colours.into_iter().enumerate() {
        let mut end = [0.0; 3];
        end[axis] = AXIS_LENGTH;
        gl.color(colour);
        gl.vertex(0.0, 0.0, 0.0);
        gl.vertex(end[0], end[1], end[2]);
    }
    gl.end();
}
